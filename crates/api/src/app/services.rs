//! Resolver wiring.
//!
//! The catalog and the creation topic are chosen from configuration:
//!
//! - `CMS_BASE_URL` set: GraphQL client against the remote catalog
//! - otherwise: in-memory catalog (dev), with a warning
//! - `SKU_EVENTS_REDIS_URL` set and built with `redis`: Redis publisher
//! - otherwise: in-memory topic

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use skucatalog_core::CatalogError;
use skucatalog_events::{InMemoryEventBus, SkuCreated};
use skucatalog_infra::{
    CatalogClient, CatalogConfig, ConfigError, EventsConfig, GraphQlCatalogClient, InMemoryCatalog,
    SkuResolution, SkuResolver,
};

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    #[cfg(feature = "redis")]
    #[error("event publisher error: {0}")]
    Publisher(#[from] skucatalog_infra::event_bus::RedisBusError),
}

/// Shared handles for request handlers.
pub struct AppServices {
    resolver: Arc<dyn SkuResolution>,
}

impl AppServices {
    pub fn new(resolver: Arc<dyn SkuResolution>) -> Self {
        Self { resolver }
    }

    /// Resolver over `catalog` announcing creations on an in-memory topic.
    pub fn with_catalog<C>(catalog: C) -> Self
    where
        C: CatalogClient + 'static,
    {
        let topic = Arc::new(InMemoryEventBus::<SkuCreated>::new());
        Self::new(Arc::new(SkuResolver::new(catalog, topic)))
    }

    pub fn resolver(&self) -> &dyn SkuResolution {
        self.resolver.as_ref()
    }
}

/// Wire services from environment configuration.
pub fn build_services() -> Result<AppServices, ServicesError> {
    let events = EventsConfig::from_env();

    match CatalogConfig::from_env()? {
        Some(config) => {
            let client = GraphQlCatalogClient::new(&config)?;
            info!(
                endpoint = %client.endpoint(),
                max_connections = config.max_connections,
                "using remote catalog"
            );
            with_events(client, &events)
        }
        None => {
            warn!("CMS_BASE_URL not set, falling back to in-memory catalog");
            with_events(InMemoryCatalog::new(), &events)
        }
    }
}

#[cfg(feature = "redis")]
fn with_events<C>(catalog: C, events: &EventsConfig) -> Result<AppServices, ServicesError>
where
    C: CatalogClient + 'static,
{
    use skucatalog_infra::event_bus::RedisTopicPublisher;

    match &events.redis_url {
        Some(url) => {
            let publisher = RedisTopicPublisher::new(url, events.creation_topic.clone())?;
            info!(topic = %events.creation_topic, "publishing sku creation events to redis");
            Ok(AppServices::new(Arc::new(SkuResolver::new(
                catalog,
                Arc::new(publisher),
            ))))
        }
        None => {
            warn!("SKU_EVENTS_REDIS_URL not set, creation events stay in-process");
            Ok(AppServices::with_catalog(catalog))
        }
    }
}

#[cfg(not(feature = "redis"))]
fn with_events<C>(catalog: C, events: &EventsConfig) -> Result<AppServices, ServicesError>
where
    C: CatalogClient + 'static,
{
    if events.redis_url.is_some() {
        warn!("SKU_EVENTS_REDIS_URL set but redis feature not enabled, falling back to in-memory topic");
    }
    Ok(AppServices::with_catalog(catalog))
}
