//! In-memory topic for tests/dev.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, MessageId, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("in-memory bus lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Best-effort fan-out; dead subscribers are dropped on publish
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<MessageId, Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        Ok(MessageId::new())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just never receives.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SkuCreated;
    use chrono::Utc;

    #[test]
    fn every_subscriber_sees_published_message() {
        let bus: InMemoryEventBus<SkuCreated> = InMemoryEventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(SkuCreated::new("SKU-1", Utc::now())).unwrap();

        assert_eq!(first.try_recv().unwrap().code, "SKU-1");
        assert_eq!(second.try_recv().unwrap().code, "SKU-1");
    }

    #[test]
    fn publish_without_subscribers_still_succeeds() {
        let bus: InMemoryEventBus<SkuCreated> = InMemoryEventBus::new();
        assert!(bus.publish(SkuCreated::new("SKU-2", Utc::now())).is_ok());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus: InMemoryEventBus<SkuCreated> = InMemoryEventBus::new();
        drop(bus.subscribe());
        let live = bus.subscribe();

        bus.publish(SkuCreated::new("SKU-3", Utc::now())).unwrap();
        assert_eq!(live.try_recv().unwrap().code, "SKU-3");
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
    }
}
