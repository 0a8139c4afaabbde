//! Bosa Noga Client - talks to the storefront API and owns the cart session.
//!
//! # Modules
//!
//! - [`api`] - HTTP client with timeout and linear-backoff retry
//! - [`storage`] - Key-value persistence for the cart (file or memory)
//! - [`cart`] - Cart session: persistence, change notifications, shared handle
//! - [`catalog`] - Catalog browsing state with stale-response protection
//! - [`checkout`] - Order assembly, local validation, and submission
//! - [`config`] - Client configuration from environment variables

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod storage;

pub use api::{ApiClient, ApiError, Health, ItemsPage, RetryPolicy};
pub use cart::{CART_STORAGE_KEY, CartSession, SharedCart};
pub use catalog::{CatalogBrowser, FetchTicket, Outcome};
pub use checkout::{CheckoutError, ContactDetails, OrderReceipt};
pub use config::{ClientConfig, ConfigError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
