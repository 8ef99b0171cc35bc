//! Infrastructure layer: catalog clients, configuration, locking, the
//! resolution engine and topic publishers.

pub mod catalog;
pub mod config;
pub mod event_bus;
pub mod locks;
pub mod resolver;

pub use catalog::{CatalogClient, GraphQlCatalogClient, InMemoryCatalog, SearchOperation};
pub use config::{CatalogConfig, ConfigError, EventsConfig};
pub use locks::KeyedLocks;
pub use resolver::{SkuResolution, SkuResolver};
