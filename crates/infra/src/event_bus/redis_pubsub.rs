//! Redis pub/sub publisher for SKU creation events.
//!
//! Pub/sub is not durable: subscribers that are offline miss messages. The
//! catalog remains the source of truth, so a dropped announcement only delays
//! downstream reactions.

use std::sync::mpsc;
use std::thread;

use redis::Commands;
use thiserror::Error;
use tracing::warn;

use skucatalog_events::{Event, EventBus, MessageId, SkuCreated, Subscription};

#[derive(Debug, Error)]
pub enum RedisBusError {
    #[error("redis error: {0}")]
    Redis(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Publishes [`SkuCreated`] as JSON on one Redis channel (the creation topic).
#[derive(Debug, Clone)]
pub struct RedisTopicPublisher {
    client: redis::Client,
    topic: String,
}

impl RedisTopicPublisher {
    pub fn new(redis_url: impl AsRef<str>, topic: impl Into<String>) -> Result<Self, RedisBusError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;
        Ok(Self {
            client,
            topic: topic.into(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl EventBus<SkuCreated> for RedisTopicPublisher {
    type Error = RedisBusError;

    fn publish(&self, message: SkuCreated) -> Result<MessageId, Self::Error> {
        let payload =
            serde_json::to_string(&message).map_err(|e| RedisBusError::Serialize(e.to_string()))?;

        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;

        let receivers: i64 = conn
            .publish(&self.topic, payload)
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;
        if receivers == 0 {
            warn!(
                topic = %self.topic,
                event_type = message.event_type(),
                version = message.version(),
                sku_code = %message.code,
                "no subscribers on creation topic"
            );
        }

        Ok(MessageId::new())
    }

    fn subscribe(&self) -> Subscription<SkuCreated> {
        let (tx, rx) = mpsc::channel();

        let client = self.client.clone();
        let topic = self.topic.clone();

        thread::spawn(move || {
            let mut conn = match client.get_connection() {
                Ok(c) => c,
                Err(e) => {
                    warn!(%topic, error = %e, "creation topic subscription failed to connect");
                    return;
                }
            };

            let mut pubsub = conn.as_pubsub();
            if pubsub.subscribe(&topic).is_err() {
                return;
            }

            loop {
                let msg = match pubsub.get_message() {
                    Ok(m) => m,
                    Err(_) => return,
                };

                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                let event: SkuCreated = match serde_json::from_str(&payload) {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(%topic, error = %e, "skipping malformed creation event");
                        continue;
                    }
                };

                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Subscription::new(rx)
    }
}
