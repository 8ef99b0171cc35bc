//! Catalog service clients.
//!
//! The resolver talks to the catalog only through [`CatalogClient`]. Two
//! implementations exist: [`GraphQlCatalogClient`] for the real service and
//! [`InMemoryCatalog`] for dev/test.

use std::sync::Arc;

use skucatalog_core::{CatalogResult, SearchQuery, Sku, SkuDraft};

pub mod graphql;
pub mod in_memory;

pub use graphql::GraphQlCatalogClient;
pub use in_memory::{CatalogCall, InMemoryCatalog};

/// Which search operation (and response projection) to issue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchOperation {
    /// Lookup by code (`IN` filter).
    ByCode,
    /// Attribute search, full projection.
    Attributes,
    /// Attribute search, reduced projection.
    AttributesLite,
}

impl SearchOperation {
    pub fn operation_name(self) -> &'static str {
        match self {
            SearchOperation::ByCode => "SearchSkuByCode",
            SearchOperation::Attributes | SearchOperation::AttributesLite => "SearchSkus",
        }
    }
}

/// Remote catalog contract.
///
/// `search` distinguishes "nothing matched" (`Ok(vec![])`) from failure
/// (`Err`). `create` returns `Ok(None)` when the catalog accepted the call but
/// sent no item back.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search(&self, operation: SearchOperation, query: &SearchQuery) -> CatalogResult<Vec<Sku>>;

    async fn create(&self, draft: &SkuDraft) -> CatalogResult<Option<Sku>>;
}

#[async_trait::async_trait]
impl<C> CatalogClient for Arc<C>
where
    C: CatalogClient + ?Sized,
{
    async fn search(&self, operation: SearchOperation, query: &SearchQuery) -> CatalogResult<Vec<Sku>> {
        (**self).search(operation, query).await
    }

    async fn create(&self, draft: &SkuDraft) -> CatalogResult<Option<Sku>> {
        (**self).create(draft).await
    }
}
