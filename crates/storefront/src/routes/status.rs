//! Informational endpoints for humans and monitoring.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::state::AppState;

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub categories: usize,
    pub products: usize,
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "API server is running" }))
}

/// `GET /health`
///
/// Liveness only. The catalog is loaded before the listener starts, so the
/// counts are informational.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        categories: state.catalog().categories().len(),
        products: state.catalog().product_count(),
    })
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
