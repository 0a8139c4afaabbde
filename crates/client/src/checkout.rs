//! Checkout: turn the cart into an order and submit it.
//!
//! The order is validated locally first; nothing is sent unless the phone,
//! the address, and every line pass. After the server accepts it, only the
//! submitted quantities are taken out of the cart.

use bosanoga_core::validation::validate_order;
use bosanoga_core::{Cart, Order, OrderOwner, Price, ValidationErrors};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::cart::SharedCart;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Order is invalid: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Order submission failed: {0}")]
    Api(#[from] ApiError),
}

/// Contact details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone: String,
    pub address: String,
}

/// What was ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReceipt {
    pub lines: usize,
    pub items: u32,
    pub total: Price,
}

/// Build an order from the cart lines and contact details.
///
/// # Errors
///
/// Returns every field that failed validation, including `items` for an
/// empty cart.
pub fn build_order(cart: &Cart, contact: &ContactDetails) -> Result<Order, ValidationErrors> {
    let order = Order {
        owner: OrderOwner {
            phone: contact.phone.trim().to_string(),
            address: contact.address.trim().to_string(),
        },
        items: cart.order_lines(),
    };
    validate_order(&order)?;
    Ok(order)
}

/// Validate, submit, and on success take the submitted quantities out.
///
/// The cart is not locked while the request is in flight; lines added or
/// raised meanwhile keep the extra quantity.
///
/// # Errors
///
/// Returns `CheckoutError::Validation` without contacting the server, or
/// `CheckoutError::Api` if submission failed. The cart is untouched in both
/// cases.
pub async fn checkout(
    api: &ApiClient,
    cart: &SharedCart,
    contact: &ContactDetails,
) -> Result<OrderReceipt, CheckoutError> {
    let snapshot = cart.snapshot().await;
    let order = build_order(&snapshot, contact)?;

    api.submit_order(&order).await?;

    let submitted = snapshot.lines();
    cart.update(|session| {
        session.remove_lines(submitted);
    })
    .await;

    let receipt = OrderReceipt {
        lines: snapshot.line_count(),
        items: snapshot.total_count(),
        total: snapshot.total_price(),
    };
    tracing::info!(lines = receipt.lines, items = receipt.items, total = %receipt.total, "Order placed");
    Ok(receipt)
}
