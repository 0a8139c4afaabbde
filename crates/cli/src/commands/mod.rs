//! Command implementations.
//!
//! Output goes through `tracing` at info level, one line per record.

pub mod cart;
pub mod catalog;
pub mod order;

use std::sync::Arc;

use bosanoga_client::{
    ApiClient, ApiError, CartSession, CheckoutError, ClientConfig, ConfigError, FileStorage,
};
use bosanoga_core::{CartError, Price, ProductPreview};
use thiserror::Error;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Product {0} not found")]
    ProductNotFound(i32),

    #[error("Cart has no product {id} in size {size}")]
    MissingLine { id: i32, size: String },

    #[error("Failed to load items: {0}")]
    Listing(String),
}

/// Configuration and API client for one invocation.
pub struct Context {
    pub config: ClientConfig,
    pub api: ApiClient,
}

impl Context {
    /// Build from the `BOSANOGA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        let api = ApiClient::new(&config)?;
        tracing::debug!(api = %config.api_url, cart_dir = %config.cart_dir.display(), "Loaded configuration");
        Ok(Self { config, api })
    }

    /// Open the persisted cart, falling back to an in-memory one.
    pub fn open_cart(&self) -> CartSession {
        match FileStorage::open(&self.config.cart_dir) {
            Ok(storage) => CartSession::initialize(Arc::new(storage)),
            Err(e) => {
                tracing::warn!(error = %e, "Cart directory unusable, changes will not be saved");
                CartSession::in_memory()
            }
        }
    }
}

/// Price, followed by the pre-discount price when there is one.
fn price_label(price: Price, old_price: Option<Price>) -> String {
    match old_price {
        Some(old) => format!("{price} (было {old})"),
        None => price.to_string(),
    }
}

fn log_previews(previews: &[ProductPreview]) {
    for preview in previews {
        tracing::info!(
            "  #{} {}  {}",
            preview.id,
            preview.title,
            price_label(preview.price, preview.old_price)
        );
    }
}
