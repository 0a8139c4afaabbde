//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Liveness message
//! GET  /health                 - Health check with catalog counts
//!
//! # Catalog
//! GET  /api/categories         - Category list
//! GET  /api/top-sales          - Featured products (previews)
//! GET  /api/items              - Paged previews (?categoryId=&offset=&q=)
//! GET  /api/items/{id}         - Full product
//!
//! # Orders
//! POST /api/order              - Submit an order (204, nothing stored)
//! ```
//!
//! Anything else answers 404 with `{"error": "Not found"}`.

pub mod catalog;
pub mod order;
pub mod status;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/top-sales", get(catalog::top_sales))
        .route("/items", get(catalog::items))
        .route("/items/{id}", get(catalog::item))
        .route("/order", post(order::submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        .nest("/api", api_routes())
        .fallback(status::not_found)
        .method_not_allowed_fallback(status::not_found)
}
