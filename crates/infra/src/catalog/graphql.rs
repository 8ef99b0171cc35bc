//! GraphQL-over-HTTP catalog client.
//!
//! One `reqwest::Client` (and its connection pool) is shared by every request.
//! A semaphore caps in-flight calls at `max_connections`; waiting for a slot,
//! connecting, and the whole call each have their own ceiling. Every failure
//! here is a Transport error, never NotFound.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use skucatalog_core::{CatalogError, CatalogResult, SearchQuery, Sku, SkuDraft};

use super::{CatalogClient, SearchOperation};
use crate::config::CatalogConfig;

const NAMESPACE_HEADER: &str = "saas-namespace";

const SEARCH_SKU_BY_CODE: &str = include_str!("../../graphql/search_sku_by_code.graphql");
const SEARCH_SKUS: &str = include_str!("../../graphql/search_skus.graphql");
const SEARCH_SKUS_LITE: &str = include_str!("../../graphql/search_skus_lite.graphql");
const CREATE_SKU: &str = include_str!("../../graphql/create_sku.graphql");

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    search_skus: Option<Vec<Sku>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    create_sku: Option<Sku>,
}

impl<T> GraphQlResponse<T> {
    fn into_data(self, operation_name: &str) -> CatalogResult<Option<T>> {
        if !self.errors.is_empty() {
            let messages = self
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CatalogError::transport(format!("{operation_name} failed: {messages}")));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Clone)]
pub struct GraphQlCatalogClient {
    http: reqwest::Client,
    endpoint: String,
    namespace_id: String,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl GraphQlCatalogClient {
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.idle_timeout)
            .pool_max_idle_per_host(config.max_connections)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CatalogError::transport(format!("failed to build catalog http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.base_url.clone(),
            namespace_id: config.namespace_id.clone(),
            permits: Arc::new(Semaphore::new(config.max_connections)),
            acquire_timeout: config.acquire_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T>(
        &self,
        operation_name: &str,
        document: &str,
        variables: JsonValue,
    ) -> CatalogResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let _permit = match tokio::time::timeout(self.acquire_timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(CatalogError::transport("catalog connection pool is closed")),
            Err(_) => {
                return Err(CatalogError::transport(format!(
                    "timed out after {:?} waiting for a catalog connection",
                    self.acquire_timeout
                )));
            }
        };

        info!(
            operation = operation_name,
            namespace = %self.namespace_id,
            "sending catalog request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(NAMESPACE_HEADER, &self.namespace_id)
            .json(&json!({
                "operationName": operation_name,
                "query": document,
                "variables": variables,
            }))
            .send()
            .await
            .map_err(|e| transport_error(operation_name, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::transport(format!(
                "{operation_name} returned {status}: {}",
                body.chars().take(500).collect::<String>()
            )));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| transport_error(operation_name, e))?;
        debug!(operation = operation_name, "catalog response received");

        body.into_data(operation_name)
    }
}

fn transport_error(operation_name: &str, err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::transport(format!("{operation_name} timed out: {err}"))
    } else if err.is_decode() {
        CatalogError::transport(format!("{operation_name} returned an undecodable response: {err}"))
    } else {
        CatalogError::transport(format!("{operation_name} failed: {err}"))
    }
}

#[async_trait::async_trait]
impl CatalogClient for GraphQlCatalogClient {
    async fn search(&self, operation: SearchOperation, query: &SearchQuery) -> CatalogResult<Vec<Sku>> {
        let document = match operation {
            SearchOperation::ByCode => SEARCH_SKU_BY_CODE,
            SearchOperation::Attributes => SEARCH_SKUS,
            SearchOperation::AttributesLite => SEARCH_SKUS_LITE,
        };

        let data: Option<SearchData> = self
            .execute(operation.operation_name(), document, query.to_variables())
            .await?;

        Ok(data.and_then(|d| d.search_skus).unwrap_or_default())
    }

    async fn create(&self, draft: &SkuDraft) -> CatalogResult<Option<Sku>> {
        let data: Option<CreateData> = self
            .execute("CreateSKU", CREATE_SKU, json!({ "sku": draft }))
            .await?;

        Ok(data.and_then(|d| d.create_sku))
    }
}
