//! Infrastructure-backed topic publishers.
//!
//! The bus abstraction lives in `skucatalog-events`; this module provides the
//! Redis implementation used in deployments.

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisBusError, RedisTopicPublisher};
