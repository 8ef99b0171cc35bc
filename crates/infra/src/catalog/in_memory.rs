//! In-memory catalog for dev/test.
//!
//! Evaluates filter predicates the way the real service does (attribute `EQ`,
//! code `IN`, order-insensitive) and records every call so tests can assert
//! the exact sequence of effects.

use std::sync::Mutex;

use skucatalog_core::{
    CatalogError, CatalogResult, FilterPredicate, FilterValue, NOT_APPLICABLE, Operator, SearchQuery,
    Sku, SkuDraft,
};

use super::{CatalogClient, SearchOperation};

/// A call observed by the in-memory catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    Search {
        operation: SearchOperation,
        query: SearchQuery,
    },
    Create {
        draft: SkuDraft,
    },
}

#[derive(Debug, Default)]
struct State {
    items: Vec<Sku>,
    calls: Vec<CatalogCall>,
    next_code: u64,
    /// Failures handed out (in order) before normal processing resumes.
    injected: Vec<CatalogError>,
    /// When set, `create` accepts the call but returns no item.
    create_returns_nothing: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an item (not recorded as a call).
    pub fn insert(&self, sku: Sku) {
        self.with_state(|s| s.items.push(sku));
    }

    pub fn items(&self) -> Vec<Sku> {
        self.with_state(|s| s.items.clone())
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn create_calls(&self) -> usize {
        self.with_state(|s| {
            s.calls
                .iter()
                .filter(|c| matches!(c, CatalogCall::Create { .. }))
                .count()
        })
    }

    /// The next call fails with `err` (after being recorded).
    pub fn fail_next(&self, err: CatalogError) {
        self.with_state(|s| s.injected.push(err));
    }

    pub fn set_create_returns_nothing(&self, value: bool) {
        self.with_state(|s| s.create_returns_nothing = value);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }
}

fn matches_filter(sku: &Sku, filter: &FilterPredicate) -> bool {
    let actual = if filter.is_attribute {
        sku.attributes
            .iter()
            .find(|a| a.name == filter.name)
            .map(|a| a.value.as_str())
            .unwrap_or(NOT_APPLICABLE)
    } else if filter.name == "code" {
        sku.code.as_str()
    } else {
        return false;
    };

    match (&filter.operator, &filter.value) {
        (Operator::Eq, FilterValue::One(expected)) => actual == expected,
        (Operator::In, FilterValue::Many(expected)) => expected.iter().any(|v| v == actual),
        (Operator::In, FilterValue::One(expected)) => actual == expected,
        (Operator::Eq, FilterValue::Many(_)) => false,
    }
}

#[async_trait::async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn search(&self, operation: SearchOperation, query: &SearchQuery) -> CatalogResult<Vec<Sku>> {
        self.with_state(|s| {
            s.calls.push(CatalogCall::Search {
                operation,
                query: query.clone(),
            });
            if !s.injected.is_empty() {
                return Err(s.injected.remove(0));
            }

            let found = s
                .items
                .iter()
                .filter(|sku| query.filters().iter().all(|f| matches_filter(sku, f)))
                .map(|sku| match operation {
                    SearchOperation::AttributesLite => Sku {
                        code: sku.code.clone(),
                        name: sku.name.clone(),
                        product_type: None,
                        shelf_life: None,
                        attributes: Vec::new(),
                    },
                    _ => sku.clone(),
                })
                .collect();
            Ok(found)
        })
    }

    async fn create(&self, draft: &SkuDraft) -> CatalogResult<Option<Sku>> {
        self.with_state(|s| {
            s.calls.push(CatalogCall::Create { draft: draft.clone() });
            if !s.injected.is_empty() {
                return Err(s.injected.remove(0));
            }
            if s.create_returns_nothing {
                return Ok(None);
            }

            s.next_code += 1;
            let sku = Sku {
                code: format!("SKU-{:06}", s.next_code),
                name: draft.name.clone(),
                product_type: Some(draft.product_type.clone()),
                shelf_life: None,
                attributes: draft.attributes.clone(),
            };
            s.items.push(sku.clone());
            Ok(Some(sku))
        })
    }
}
