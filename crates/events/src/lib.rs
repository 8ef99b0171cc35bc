//! SKU lifecycle events and the topic abstraction they are published through.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, MessageId, Subscription};
pub use event::{Event, SkuCreated};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
