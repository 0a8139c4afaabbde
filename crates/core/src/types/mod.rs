//! Core types for Bosa Noga.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;

pub use id::*;
pub use order::{Order, OrderLine, OrderOwner, OrderShapeError};
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use product::{Category, Product, ProductPreview, Size};
