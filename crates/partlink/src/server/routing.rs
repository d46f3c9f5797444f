//! Axum router configuration for all endpoints

use axum::{
  routing::{get, post},
  Router,
};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::server::handlers;

/// Create the main application router over a shared catalog
pub fn create_router(catalog: Arc<Catalog>) -> Router {
  Router::new()
    // Status endpoints
    .route("/status", get(handlers::status))
    .route("/reload", post(handlers::reload))
    // Picker endpoints
    .route("/categories", get(handlers::categories))
    .route("/models", get(handlers::models))
    // Part lookups
    .route("/parts/code/{code}", get(handlers::by_code))
    .route("/parts/model/{model}", get(handlers::by_model))
    .route("/parts/search", get(handlers::by_text))
    .with_state(catalog)
}
