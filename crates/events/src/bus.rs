//! Topic publishing/subscription abstraction (mechanics only).
//!
//! SKU creation is announced on a topic so downstream systems can react. The
//! bus makes minimal assumptions:
//!
//! - **Transport-agnostic**: in-memory channels, Redis pub/sub, a broker, etc.
//! - **At-most-once from the publisher's side**: callers issue one publish per
//!   event and do not retry; a failed publish is the caller's to log.
//! - **No persistence**: the catalog is the source of truth, not the topic.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier the bus assigns to an accepted message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Uses UUIDv7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for MessageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A subscription to a topic.
///
/// Each subscription gets a copy of every message published after it was
/// created (broadcast semantics). Meant for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Topic-style event bus.
///
/// `publish` is blocking; async callers should move it off the request path
/// (e.g. `spawn_blocking`). Implementations must be `Send + Sync` so one bus
/// can serve every request.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Publish one message, returning the identifier the bus assigned to it.
    fn publish(&self, message: M) -> Result<MessageId, Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<MessageId, Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
