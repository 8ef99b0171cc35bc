//! `skucatalog-core`: SKU resolution building blocks.
//!
//! This crate contains **pure domain** logic for resolving fish-product SKUs:
//! attribute modelling, sanitization, catalog query construction, name
//! composition and expiry date math. No IO lives here.

pub mod attributes;
pub mod error;
pub mod expiry;
pub mod naming;
pub mod query;
pub mod sanitize;
pub mod search;
pub mod sku;

pub use attributes::{AttributeName, AttributeSet};
pub use error::{CatalogError, CatalogResult};
pub use expiry::ShelfLife;
pub use query::{FilterPredicate, FilterValue, Operator, SearchQuery};
pub use sanitize::{NOT_APPLICABLE, is_set, sanitize};
pub use search::{CodeList, SearchRequest, SearchType, SkuSearch};
pub use sku::{Sku, SkuAttribute, SkuDraft};
