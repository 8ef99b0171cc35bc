//! SKU resolution engine.
//!
//! Orchestrates search, get-or-create and expiry lookups over a
//! [`CatalogClient`], and announces creations on an [`EventBus`].
//!
//! ```text
//! get_or_create
//!   ↓
//! Searching ──found──────────────→ Found
//!   │ NotFound
//!   ↓
//! NotFoundFallback → Creating ──→ Created ──→ publish (detached)
//!   │ any other error
//!   ↓
//! Failed (error propagated unchanged)
//! ```
//!
//! Only a NotFound outcome triggers creation. Transport, conflict and
//! validation failures propagate to the caller as-is; nothing is retried here.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use skucatalog_core::expiry::{self, ShelfLife};
use skucatalog_core::{
    AttributeName, AttributeSet, CatalogError, CatalogResult, SearchQuery, Sku, SkuDraft, SkuSearch,
};
use skucatalog_events::{Event, EventBus, SkuCreated};

use crate::catalog::{CatalogClient, SearchOperation};
use crate::locks::KeyedLocks;

/// Object-safe resolution surface consumed by the HTTP layer.
#[async_trait::async_trait]
pub trait SkuResolution: Send + Sync {
    async fn search(&self, search: SkuSearch) -> CatalogResult<Vec<Sku>>;

    async fn get_or_create(&self, attributes: &AttributeSet) -> CatalogResult<Sku>;

    async fn compute_expiry(
        &self,
        code: &str,
        reference: Option<DateTime<Utc>>,
    ) -> CatalogResult<DateTime<Utc>>;
}

/// Resolution engine over catalog `C` and creation topic `B`.
pub struct SkuResolver<C, B> {
    catalog: C,
    bus: Arc<B>,
    creation_locks: KeyedLocks,
}

impl<C, B> SkuResolver<C, B>
where
    C: CatalogClient,
    B: EventBus<SkuCreated> + 'static,
{
    pub fn new(catalog: C, bus: Arc<B>) -> Self {
        Self {
            catalog,
            bus,
            creation_locks: KeyedLocks::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Items for every requested code.
    ///
    /// An empty response is NotFound; a response missing some of the requested
    /// codes is a Conflict naming the missing ones.
    pub async fn find_by_codes(&self, codes: &[String]) -> CatalogResult<Vec<Sku>> {
        if codes.is_empty() {
            return Err(CatalogError::invalid_argument("at least one sku code is required"));
        }

        let query = SearchQuery::by_codes(codes.iter().cloned());
        info!(?codes, "searching skus by code");

        let skus = self.catalog.search(SearchOperation::ByCode, &query).await?;
        if skus.is_empty() {
            return Err(CatalogError::not_found(format!(
                "sku search by codes returned no items, requested codes: {codes:?}"
            )));
        }

        let returned: BTreeSet<&str> = skus.iter().map(|s| s.code.as_str()).collect();
        let missing: BTreeSet<&str> = codes
            .iter()
            .map(String::as_str)
            .filter(|code| !returned.contains(code))
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::conflict(format!(
                "SKUs with these codes not found: {missing:?}"
            )));
        }

        Ok(skus)
    }

    /// The single item matching every attribute dimension.
    pub async fn find_exact_by_attributes(&self, attributes: &AttributeSet) -> CatalogResult<Sku> {
        let query = SearchQuery::strict_all(attributes);
        info!(fingerprint = %attributes.fingerprint(), "searching sku by exact attributes");

        let mut skus = self.catalog.search(SearchOperation::Attributes, &query).await?;
        match skus.len() {
            0 => Err(CatalogError::not_found(format!(
                "no sku found for attributes {}",
                attributes.fingerprint()
            ))),
            1 => Ok(skus.remove(0)),
            n => {
                let codes: Vec<&str> = skus.iter().map(|s| s.code.as_str()).collect();
                error!(
                    count = n,
                    ?codes,
                    fingerprint = %attributes.fingerprint(),
                    "multiple skus found for the given attributes"
                );
                Err(CatalogError::conflict(format!(
                    "{n} skus found for attributes {}: {codes:?}",
                    attributes.fingerprint()
                )))
            }
        }
    }

    /// Items matching the set dimensions only; unset dimensions do not constrain.
    pub async fn find_alike_by_attributes(
        &self,
        attributes: &AttributeSet,
        lite: bool,
    ) -> CatalogResult<Vec<Sku>> {
        let query = SearchQuery::skip_unset(attributes);
        let operation = if lite {
            SearchOperation::AttributesLite
        } else {
            SearchOperation::Attributes
        };
        info!(filters = query.len(), lite, "searching alike skus");

        let skus = self.catalog.search(operation, &query).await?;
        if skus.is_empty() {
            return Err(CatalogError::not_found(format!(
                "no alike skus found for attributes {}",
                attributes.fingerprint()
            )));
        }
        Ok(skus)
    }

    /// Exact match, or a newly created item when none exists.
    ///
    /// Identical requests are serialized per attribute fingerprint, so at most
    /// one creation happens per fingerprint within this process.
    pub async fn get_or_create(&self, attributes: &AttributeSet) -> CatalogResult<Sku> {
        let fingerprint = attributes.fingerprint();
        let _guard = self.creation_locks.lock(&fingerprint).await;

        match self.find_exact_by_attributes(attributes).await {
            Ok(sku) => Ok(sku),
            Err(CatalogError::NotFound(reason)) => {
                info!(%fingerprint, %reason, "sku not found, creating");
                self.create(attributes).await
            }
            Err(err) => Err(err),
        }
    }

    /// Create an item from validated attributes and announce it.
    ///
    /// Success is defined by the catalog accepting the item; the creation event
    /// is published in the background and its failure is only logged.
    pub async fn create(&self, attributes: &AttributeSet) -> CatalogResult<Sku> {
        attributes.validate_for_creation()?;

        let draft = SkuDraft::from_attributes(attributes);
        info!(name = %draft.name, attributes = draft.attributes.len(), "creating sku");

        let sku = self.catalog.create(&draft).await?.ok_or_else(|| {
            CatalogError::not_found(format!("no sku in creation response for '{}'", draft.name))
        })?;

        info!(sku_code = %sku.code, "sku created");
        self.publish_created(&sku.code);

        Ok(sku)
    }

    /// Dispatch a validated search request.
    pub async fn search(&self, search: SkuSearch) -> CatalogResult<Vec<Sku>> {
        match search {
            SkuSearch::ByCodes(codes) => self.find_by_codes(&codes).await,
            SkuSearch::ByAttributes(attributes) => {
                self.find_exact_by_attributes(&attributes).await.map(|sku| vec![sku])
            }
            SkuSearch::Alike { attributes, lite } => {
                self.find_alike_by_attributes(&attributes, lite).await
            }
        }
    }

    /// Expiry date of `code`, counted from `reference` (default: now).
    ///
    /// Missing or malformed shelf life never fails the call; the default for
    /// the item's freezing method applies instead.
    pub async fn compute_expiry(
        &self,
        code: &str,
        reference: Option<DateTime<Utc>>,
    ) -> CatalogResult<DateTime<Utc>> {
        let reference = reference.unwrap_or_else(Utc::now);
        info!(sku_code = %code, %reference, "computing sku expiry");

        let skus = self.find_by_codes(&[code.to_string()]).await?;
        let sku = skus
            .into_iter()
            .find(|s| s.code == code)
            .ok_or_else(|| CatalogError::not_found(format!("sku {code} not found")))?;

        let freezing_method = sku.attribute(AttributeName::FreezingMethod);
        let shelf_life = ShelfLife::parse(sku.shelf_life.as_deref());
        let expiry = expiry::expiry_date(reference, &shelf_life, freezing_method);

        match &shelf_life {
            ShelfLife::Missing => {
                info!(sku_code = %code, %expiry, "no shelf life recorded, using default");
            }
            ShelfLife::Days(days) => {
                if expiry::checked_expiry_date(reference, &shelf_life, freezing_method).is_some() {
                    info!(sku_code = %code, days, %expiry, "expiry from recorded shelf life");
                } else {
                    warn!(sku_code = %code, days, %expiry, "shelf life from catalog overflows the calendar, using default");
                }
            }
            ShelfLife::Malformed(raw) => {
                warn!(sku_code = %code, shelf_life = %raw, %expiry, "invalid shelf life from catalog, using default");
            }
        }

        Ok(expiry)
    }

    fn publish_created(&self, code: &str) {
        let bus = Arc::clone(&self.bus);
        let event = SkuCreated::new(code, Utc::now());
        let event_type = event.event_type();
        let version = event.version();
        let occurred_at = event.occurred_at();
        let code = code.to_string();

        tokio::task::spawn_blocking(move || match bus.publish(event) {
            Ok(message_id) => {
                info!(sku_code = %code, event_type, version, %occurred_at, %message_id, "sku creation event published");
            }
            Err(err) => {
                error!(sku_code = %code, event_type, version, error = ?err, "failed to publish sku creation event");
            }
        });
    }
}

#[async_trait::async_trait]
impl<C, B> SkuResolution for SkuResolver<C, B>
where
    C: CatalogClient,
    B: EventBus<SkuCreated> + 'static,
{
    async fn search(&self, search: SkuSearch) -> CatalogResult<Vec<Sku>> {
        SkuResolver::search(self, search).await
    }

    async fn get_or_create(&self, attributes: &AttributeSet) -> CatalogResult<Sku> {
        SkuResolver::get_or_create(self, attributes).await
    }

    async fn compute_expiry(
        &self,
        code: &str,
        reference: Option<DateTime<Utc>>,
    ) -> CatalogResult<DateTime<Utc>> {
        SkuResolver::compute_expiry(self, code, reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::TimeZone;
    use skucatalog_core::SkuAttribute;
    use skucatalog_events::{InMemoryEventBus, MessageId, Subscription};

    use crate::catalog::{CatalogCall, InMemoryCatalog};

    type TestResolver = SkuResolver<Arc<InMemoryCatalog>, InMemoryEventBus<SkuCreated>>;

    fn setup() -> (TestResolver, Arc<InMemoryCatalog>, Subscription<SkuCreated>) {
        let catalog = Arc::new(InMemoryCatalog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let subscription = bus.subscribe();
        let resolver = SkuResolver::new(Arc::clone(&catalog), bus);
        (resolver, catalog, subscription)
    }

    fn shrimp() -> AttributeSet {
        AttributeSet::new()
            .with(AttributeName::Species, "Vannamei")
            .with(AttributeName::ProductType, "HLSO")
            .with(AttributeName::FreezingMethod, "IQF")
            .with(AttributeName::UnitPerCarton, "10")
            .with(AttributeName::QuantityPerUnit, "2")
    }

    fn sku(code: &str, shelf_life: Option<&str>, freezing_method: &str) -> Sku {
        Sku {
            code: code.to_string(),
            name: format!("{code} name"),
            product_type: Some("FAAS".to_string()),
            shelf_life: shelf_life.map(str::to_string),
            attributes: vec![SkuAttribute {
                name: "freezing_method".to_string(),
                value: freezing_method.to_string(),
            }],
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn recv_event(subscription: &Subscription<SkuCreated>) -> Option<SkuCreated> {
        subscription.recv_timeout(Duration::from_secs(2)).ok()
    }

    #[tokio::test]
    async fn find_by_codes_returns_every_requested_item() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("A", None, "IQF"));
        catalog.insert(sku("B", None, "IQF"));

        let found = resolver
            .find_by_codes(&["A".to_string(), "B".to_string(), "A".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn find_by_codes_with_partial_result_is_a_conflict_naming_missing_codes() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("A", None, "IQF"));

        let err = resolver
            .find_by_codes(&["A".to_string(), "B".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::conflict(r#"SKUs with these codes not found: {"B"}"#));
    }

    #[tokio::test]
    async fn find_by_codes_with_empty_result_is_not_found() {
        let (resolver, _catalog, _events) = setup();
        let err = resolver.find_by_codes(&["A".to_string()]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn exact_search_with_two_matches_is_a_conflict() {
        let (resolver, catalog, _events) = setup();
        let draft = SkuDraft::from_attributes(&shrimp());
        for code in ["DUP-1", "DUP-2"] {
            catalog.insert(Sku {
                code: code.to_string(),
                name: draft.name.clone(),
                product_type: None,
                shelf_life: None,
                attributes: draft.attributes.clone(),
            });
        }

        let err = resolver.find_exact_by_attributes(&shrimp()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(msg) if msg.contains("DUP-1") && msg.contains("DUP-2")));
    }

    #[tokio::test]
    async fn get_or_create_creates_and_publishes_once_when_missing() {
        let (resolver, catalog, events) = setup();

        let created = resolver.get_or_create(&shrimp()).await.unwrap();
        assert_eq!(created.name, "Vannamei HLSO IQF 10x2");

        let calls = catalog.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(
            &calls[0],
            CatalogCall::Search { operation: SearchOperation::Attributes, query } if query.len() == 14
        ));
        assert!(matches!(&calls[1], CatalogCall::Create { .. }));

        let event = recv_event(&events).expect("creation event published");
        assert_eq!(event.code, created.code);
        assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[tokio::test]
    async fn get_or_create_returns_existing_without_side_effects() {
        let (resolver, catalog, events) = setup();
        let existing = resolver.create(&shrimp()).await.unwrap();
        recv_event(&events).expect("seed creation event");
        let calls_before = catalog.calls().len();

        let found = resolver.get_or_create(&shrimp()).await.unwrap();
        assert_eq!(found, existing);

        let calls = catalog.calls();
        assert_eq!(calls.len(), calls_before + 1);
        assert!(matches!(calls.last(), Some(CatalogCall::Search { .. })));
        assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[tokio::test]
    async fn transport_failure_does_not_fall_through_to_create() {
        let (resolver, catalog, _events) = setup();
        catalog.fail_next(CatalogError::transport("connection reset"));

        let err = resolver.get_or_create(&shrimp()).await.unwrap_err();
        assert_eq!(err, CatalogError::transport("connection reset"));
        assert_eq!(catalog.create_calls(), 0);
    }

    #[tokio::test]
    async fn ambiguous_match_does_not_fall_through_to_create() {
        let (resolver, catalog, _events) = setup();
        let draft = SkuDraft::from_attributes(&shrimp());
        for code in ["X", "Y"] {
            catalog.insert(Sku {
                code: code.to_string(),
                name: draft.name.clone(),
                product_type: None,
                shelf_life: None,
                attributes: draft.attributes.clone(),
            });
        }

        let err = resolver.get_or_create(&shrimp()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
        assert_eq!(catalog.create_calls(), 0);
    }

    #[tokio::test]
    async fn create_rejects_invalid_attributes_before_calling_catalog() {
        let (resolver, catalog, _events) = setup();
        let attrs = AttributeSet::new().with(AttributeName::Species, "Tuna");

        let err = resolver.get_or_create(&attrs).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(catalog.create_calls(), 0);
    }

    #[tokio::test]
    async fn empty_creation_response_is_not_found_and_publishes_nothing() {
        let (resolver, catalog, events) = setup();
        catalog.set_create_returns_nothing(true);

        let err = resolver.create(&shrimp()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[derive(Debug, Default)]
    struct BrokenTopic {
        attempts: AtomicUsize,
    }

    impl EventBus<SkuCreated> for BrokenTopic {
        type Error = &'static str;

        fn publish(&self, _message: SkuCreated) -> Result<MessageId, Self::Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err("topic unavailable")
        }

        fn subscribe(&self) -> Subscription<SkuCreated> {
            let (_tx, rx) = std::sync::mpsc::channel();
            Subscription::new(rx)
        }
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_creation() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let topic = Arc::new(BrokenTopic::default());
        let resolver = SkuResolver::new(Arc::clone(&catalog), Arc::clone(&topic));

        let sku = resolver.create(&shrimp()).await.unwrap();
        assert_eq!(catalog.items(), vec![sku]);

        tokio::time::timeout(Duration::from_secs(2), async {
            while topic.attempts.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("publish attempted");
        assert_eq!(topic.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_identical_requests_create_once() {
        let (resolver, catalog, _events) = setup();
        let resolver = Arc::new(resolver);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.get_or_create(&shrimp()).await })
            })
            .collect();

        let mut codes = BTreeSet::new();
        for task in tasks {
            codes.insert(task.await.unwrap().unwrap().code);
        }

        assert_eq!(codes.len(), 1);
        assert_eq!(catalog.create_calls(), 1);
    }

    #[tokio::test]
    async fn alike_search_only_filters_set_dimensions() {
        let (resolver, catalog, _events) = setup();
        resolver.create(&shrimp()).await.unwrap();
        resolver
            .create(&shrimp().with(AttributeName::Grade, "A"))
            .await
            .unwrap();

        let probe = AttributeSet::new().with(AttributeName::Species, "Vannamei");
        let found = resolver.find_alike_by_attributes(&probe, true).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.attributes.is_empty()));

        assert!(matches!(
            catalog.calls().last(),
            Some(CatalogCall::Search { operation: SearchOperation::AttributesLite, query }) if query.len() == 1
        ));
    }

    #[tokio::test]
    async fn alike_search_without_matches_is_not_found() {
        let (resolver, _catalog, _events) = setup();
        let probe = AttributeSet::new().with(AttributeName::Species, "Octopus");
        let err = resolver.find_alike_by_attributes(&probe, false).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn search_dispatches_by_request_kind() {
        let (resolver, catalog, _events) = setup();
        let created = resolver.create(&shrimp()).await.unwrap();
        catalog.insert(sku("OTHER", None, "IQF"));

        let by_code = resolver
            .search(SkuSearch::ByCodes(vec![created.code.clone()]))
            .await
            .unwrap();
        assert_eq!(by_code, vec![created.clone()]);

        let exact = resolver.search(SkuSearch::ByAttributes(shrimp())).await.unwrap();
        assert_eq!(exact, vec![created]);
    }

    #[tokio::test]
    async fn fresh_item_without_shelf_life_expires_in_fourteen_days() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("FRESH", None, "Fresh"));

        let expiry = resolver.compute_expiry("FRESH", Some(reference())).await.unwrap();
        assert_eq!(expiry, reference() + chrono::Duration::days(14));
    }

    #[tokio::test]
    async fn malformed_shelf_life_falls_back_to_two_years() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("FROZEN", Some("invalid"), "Frozen"));

        let expiry = resolver.compute_expiry("FROZEN", Some(reference())).await.unwrap();
        assert_eq!(expiry, reference() + chrono::Duration::days(730));
    }

    #[tokio::test]
    async fn recorded_shelf_life_is_used() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("KEEP", Some("100"), "Frozen"));

        let expiry = resolver.compute_expiry("KEEP", Some(reference())).await.unwrap();
        assert_eq!(expiry, reference() + chrono::Duration::days(100));
    }

    #[tokio::test]
    async fn oversized_shelf_life_falls_back_to_default() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("BIG", Some("100000000"), "Frozen"));

        let expiry = resolver.compute_expiry("BIG", Some(reference())).await.unwrap();
        assert_eq!(expiry, reference() + chrono::Duration::days(730));

        let before = Utc::now();
        let expiry = resolver.compute_expiry("BIG", None).await.unwrap();
        assert!(expiry >= before + chrono::Duration::days(730));
    }

    #[tokio::test]
    async fn expiry_defaults_reference_to_now() {
        let (resolver, catalog, _events) = setup();
        catalog.insert(sku("NOW", Some("1"), "Frozen"));

        let before = Utc::now();
        let expiry = resolver.compute_expiry("NOW", None).await.unwrap();
        assert!(expiry >= before + chrono::Duration::days(1));
        assert!(expiry <= Utc::now() + chrono::Duration::days(1));
    }

    #[tokio::test]
    async fn expiry_for_unknown_code_is_not_found() {
        let (resolver, _catalog, _events) = setup();
        let err = resolver.compute_expiry("GHOST", Some(reference())).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
