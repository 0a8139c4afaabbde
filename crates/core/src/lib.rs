//! Bosa Noga Core - Shared domain library.
//!
//! This crate provides the domain logic used across all Bosa Noga components:
//! - `storefront` - JSON API server for the catalog and order intake
//! - `client` - API client, cart session, and checkout
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions, and traits - no I/O,
//! no HTTP, no storage access. Everything here can be exercised from a plain
//! unit test.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, phone numbers, products, and orders
//! - [`catalog`] - In-memory catalog store and paginated query engine
//! - [`cart`] - Cart state machine (pure snapshot-to-snapshot functions)
//! - [`validation`] - Field-keyed validation shared by the cart and checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;
pub mod validation;

pub use cart::{AddToCart, Cart, CartError, CartIssue, CartLine, CartReport, CartSummary};
pub use catalog::{Catalog, CatalogError, CatalogQuery, PAGE_SIZE, Page, TOP_SALE_IDS};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
