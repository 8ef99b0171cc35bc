//! Axum router and service wiring.
//!
//! - `services.rs`: resolver wiring (catalog client, creation topic)
//! - `routes/`: HTTP handlers
//! - `responder.rs`: success body shapes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

pub mod errors;
pub mod responder;
pub mod routes;
pub mod services;

use responder::{CmsResponder, SkuResponder};
use services::AppServices;

/// Full router with the standard `{data, status}` envelope.
pub fn build_app(services: Arc<AppServices>) -> Router {
    build_app_with(services, CmsResponder)
}

/// Full router with a caller-chosen success body shape.
pub fn build_app_with<R: SkuResponder>(services: Arc<AppServices>, responder: R) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/cms", routes::cms::router(responder))
        .layer(Extension(services))
}
