//! Order intake.
//!
//! Orders are shape-checked, logged, and dropped. Nothing is stored.

use axum::{body::Bytes, http::StatusCode};
use bosanoga_core::Order;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};

/// `POST /api/order`
///
/// Answers 204 when `owner.phone` and `owner.address` are strings and
/// `items` is an array of `{id, price, count}` numbers.
#[instrument(skip(body), fields(body_len = body.len()))]
pub async fn submit(body: Bytes) -> Result<StatusCode> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))?;

    let order = Order::from_wire(&body).inspect_err(|e| {
        tracing::info!(reason = %e, "Order rejected");
    })?;

    let total = order.total();
    tracing::info!(
        lines = order.items.len(),
        total = %total,
        "Order accepted"
    );
    add_breadcrumb(
        "order",
        "Order accepted",
        &[("lines", order.items.len().to_string()), ("total", total.to_string())],
    );

    Ok(StatusCode::NO_CONTENT)
}
