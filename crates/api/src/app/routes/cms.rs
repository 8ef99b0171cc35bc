//! SKU search, find-or-create and expiry endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use skucatalog_core::{AttributeSet, SearchRequest, SkuSearch};

use crate::app::errors;
use crate::app::responder::SkuResponder;
use crate::app::services::AppServices;

pub fn router<R: SkuResponder>(responder: R) -> Router {
    Router::new()
        .route("/search", post(search::<R>))
        .route("/find-or-create", post(find_or_create::<R>))
        .route("/skus/:code/expiry", get(expiry))
        .layer(Extension(Arc::new(responder)))
}

pub async fn search<R: SkuResponder>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(responder): Extension<Arc<R>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    info!(request = ?body, "sku search request");

    let search = match SkuSearch::try_from(body) {
        Ok(s) => s,
        Err(e) => return errors::catalog_error_to_response(e),
    };

    match services.resolver().search(search).await {
        Ok(skus) => (StatusCode::OK, Json(responder.respond(skus))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn find_or_create<R: SkuResponder>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(responder): Extension<Arc<R>>,
    attributes: Result<Json<AttributeSet>, JsonRejection>,
) -> axum::response::Response {
    let Json(attributes) = match attributes {
        Ok(attributes) => attributes,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    info!(fingerprint = %attributes.fingerprint(), "find-or-create request");

    match services.resolver().get_or_create(&attributes).await {
        Ok(sku) => (StatusCode::OK, Json(responder.respond(vec![sku]))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpiryParams {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ExpiryResponse {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn expiry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
    Query(params): Query<ExpiryParams>,
) -> axum::response::Response {
    match services.resolver().compute_expiry(&code, params.created_at).await {
        Ok(expires_at) => (StatusCode::OK, Json(ExpiryResponse { code, expires_at })).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
