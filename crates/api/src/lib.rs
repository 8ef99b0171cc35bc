//! HTTP API for SKU resolution: server wiring, routing and response mapping.

pub mod app;
