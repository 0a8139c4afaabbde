//! Cart state machine.
//!
//! A [`Cart`] is an immutable snapshot: an ordered list of lines keyed by
//! `(product id, size)`. Every mutator borrows the current snapshot and
//! returns the next one, so callers always apply a change to the latest
//! state instead of a value captured earlier.
//!
//! Stored counts always stay within
//! [`MIN_QUANTITY`](crate::validation::MIN_QUANTITY)..=[`MAX_QUANTITY`](crate::validation::MAX_QUANTITY).

use core::fmt;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::{OrderLine, Price, Product, ProductId};
use crate::validation::{
    MAX_QUANTITY, ValidationErrors, clamp_quantity, is_blank, is_valid_quantity,
    validate_line_fields, validate_requested_quantity,
};

/// Errors raised by cart mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The line to add is malformed (count, size, title, or price).
    #[error("invalid cart line: {0}")]
    Validation(#[from] ValidationErrors),

    /// The product does not offer the requested size.
    #[error("product {product} has no size {size:?}")]
    UnknownSize { product: ProductId, size: String },

    /// The size exists but is not available.
    #[error("size {size:?} of product {product} is not available")]
    SizeUnavailable { product: ProductId, size: String },
}

// =============================================================================
// Lines
// =============================================================================

/// One `(product, size)` entry in the cart.
///
/// `title` and `price` are snapshots taken when the line was first added and
/// are never re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub title: String,
    pub size: String,
    pub price: Price,
    pub count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartLine {
    /// Whether this line has the given key.
    #[must_use]
    pub fn is_keyed(&self, id: ProductId, size: &str) -> bool {
        self.id == id && self.size == size
    }

    /// `price * count` for this line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(u32::from(self.count))
    }

    /// The order line submitted for this cart line.
    #[must_use]
    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            id: self.id,
            price: self.price,
            count: i64::from(self.count),
        }
    }

    /// Decode a persisted entry, rejecting anything with the wrong shape.
    ///
    /// Counts above the maximum are clamped rather than rejected.
    fn from_persisted(entry: &Value) -> Option<Self> {
        let object = entry.as_object()?;

        let id = object
            .get("id")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())?;
        let title = object.get("title").and_then(Value::as_str)?;
        let size = object.get("size").and_then(Value::as_str)?;
        let price = match object.get("price")? {
            Value::Number(n) => Price::from_json_number(n)?,
            _ => return None,
        };
        let count = object.get("count").and_then(Value::as_i64)?;
        if count <= 0 {
            return None;
        }
        let image = match object.get("image") {
            None | Some(Value::Null) => None,
            Some(Value::String(url)) => Some(url.clone()),
            Some(_) => return None,
        };

        Some(Self {
            id: ProductId::new(id),
            title: title.to_owned(),
            size: size.to_owned(),
            price,
            count: clamp_quantity(count),
            image,
        })
    }
}

/// Input to [`Cart::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub title: String,
    pub size: String,
    pub price: Price,
    /// Requested quantity. Must be at least 1; values above the maximum are
    /// clamped.
    pub count: i64,
    pub image: Option<String>,
}

impl AddToCart {
    /// Build an add request from a catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownSize`] if the product has no such size and
    /// [`CartError::SizeUnavailable`] if the size cannot be ordered.
    pub fn for_product(product: &Product, size: &str, count: i64) -> Result<Self, CartError> {
        let offered = product.size(size).ok_or_else(|| CartError::UnknownSize {
            product: product.id,
            size: size.to_owned(),
        })?;
        if !offered.available {
            return Err(CartError::SizeUnavailable {
                product: product.id,
                size: size.to_owned(),
            });
        }

        Ok(Self {
            product_id: product.id,
            title: product.title.clone(),
            size: offered.size.clone(),
            price: product.price,
            count,
            image: product.first_image().map(str::to_owned),
        })
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An immutable cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    fn line_mut(&mut self, id: ProductId, size: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.is_keyed(id, size))
    }

    /// Add a product/size, merging with an existing line.
    ///
    /// An existing line ends up with `min(10, existing + count)`; a new line
    /// is appended with `min(10, count)`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Validation`] when `count < 1`, the size or title
    /// is blank, or the price is not positive. The snapshot is unchanged.
    pub fn add(&self, item: AddToCart) -> Result<Self, CartError> {
        let mut errors = match validate_line_fields(&item.title, &item.size, item.price) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Err(e) = validate_requested_quantity(item.count) {
            errors.push(e);
        }
        errors.into_result()?;

        let mut next = self.clone();
        match next.line_mut(item.product_id, &item.size) {
            Some(line) => {
                line.count = clamp_quantity(i64::from(line.count).saturating_add(item.count));
            }
            None => next.lines.push(CartLine {
                id: item.product_id,
                title: item.title,
                size: item.size,
                price: item.price,
                count: clamp_quantity(item.count),
                image: item.image,
            }),
        }
        Ok(next)
    }

    /// Remove a line. Absent lines are ignored.
    #[must_use]
    pub fn remove(&self, id: ProductId, size: &str) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|line| !line.is_keyed(id, size))
                .cloned()
                .collect(),
        }
    }

    /// Set a line's quantity. `count <= 0` removes the line; anything else is
    /// clamped to the allowed range. Absent lines are ignored.
    #[must_use]
    pub fn update_quantity(&self, id: ProductId, size: &str, count: i64) -> Self {
        if count <= 0 {
            return self.remove(id, size);
        }
        let mut next = self.clone();
        if let Some(line) = next.line_mut(id, size) {
            line.count = clamp_quantity(count);
        }
        next
    }

    /// Increment or decrement a line relative to its current count.
    #[must_use]
    pub fn adjust(&self, id: ProductId, size: &str, delta: i64) -> Self {
        match self.quantity_of(id, size) {
            Some(current) => self.update_quantity(id, size, i64::from(current).saturating_add(delta)),
            None => self.clone(),
        }
    }

    /// An empty cart.
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Take the `submitted` quantities out of the cart.
    ///
    /// Each matching line loses the submitted count and is removed once it
    /// reaches zero. Lines not in `submitted`, and any quantity added on top
    /// of a submitted line, are kept.
    #[must_use]
    pub fn without_submitted(&self, submitted: &[CartLine]) -> Self {
        let lines = self
            .lines
            .iter()
            .filter_map(|line| {
                let Some(sent) = submitted.iter().find(|s| line.is_keyed(s.id, &s.size)) else {
                    return Some(line.clone());
                };
                let left = line.count.saturating_sub(sent.count);
                (left > 0).then(|| CartLine {
                    count: left,
                    ..line.clone()
                })
            })
            .collect();
        Self { lines }
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of items (sum of counts).
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.lines.iter().map(|line| u32::from(line.count)).sum()
    }

    /// Total price (sum of `price * count`).
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ProductId, size: &str) -> bool {
        self.line(id, size).is_some()
    }

    /// Quantity of a line, if present.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId, size: &str) -> Option<u8> {
        self.line(id, size).map(|line| line.count)
    }

    #[must_use]
    pub fn line(&self, id: ProductId, size: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.is_keyed(id, size))
    }

    /// Order lines for checkout.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines.iter().map(CartLine::to_order_line).collect()
    }

    /// Derived summary of the snapshot.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            lines: self.line_count(),
            items: self.total_count(),
            total_price: self.total_price(),
            is_empty: self.is_empty(),
        }
    }

    /// Check the snapshot against the cart invariants.
    #[must_use]
    pub fn validate(&self) -> CartReport {
        let mut issues = Vec::new();
        if self.lines.is_empty() {
            issues.push(CartIssue::Empty);
        }
        for (index, line) in self.lines.iter().enumerate() {
            let position = index + 1;
            if !is_valid_quantity(i64::from(line.count)) {
                issues.push(CartIssue::CountOutOfRange {
                    line: position,
                    count: line.count,
                });
            }
            if is_blank(&line.size) {
                issues.push(CartIssue::BlankSize { line: position });
            }
            if is_blank(&line.title) {
                issues.push(CartIssue::BlankTitle { line: position });
            }
            if !line.price.is_positive() {
                issues.push(CartIssue::NonPositivePrice { line: position });
            }
        }
        CartReport { issues }
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Serialize the lines as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Load a persisted cart, dropping malformed entries.
    ///
    /// Returns the cart and the number of entries that were dropped. A
    /// document that is not a JSON array yields an empty cart. Counts above
    /// the maximum are clamped, and a repeated `(id, size)` keeps its first
    /// occurrence.
    #[must_use]
    pub fn from_persisted(raw: &str) -> (Self, usize) {
        let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
            return (Self::new(), 0);
        };

        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(entries.len());
        for entry in &entries {
            if let Some(line) = CartLine::from_persisted(entry)
                && seen.insert((line.id, line.size.clone()))
            {
                lines.push(line);
            }
        }

        let dropped = entries.len() - lines.len();
        (Self { lines }, dropped)
    }
}

/// Derived read view of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: usize,
    pub items: u32,
    pub total_price: Price,
    pub is_empty: bool,
}

// =============================================================================
// Validation report
// =============================================================================

/// A problem found by [`Cart::validate`]. Line numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartIssue {
    Empty,
    CountOutOfRange { line: usize, count: u8 },
    BlankSize { line: usize },
    BlankTitle { line: usize },
    NonPositivePrice { line: usize },
}

impl fmt::Display for CartIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "cart is empty"),
            Self::CountOutOfRange { line, count } => {
                write!(f, "line {line}: quantity {count} is outside 1..={MAX_QUANTITY}")
            }
            Self::BlankSize { line } => write!(f, "line {line}: size is not selected"),
            Self::BlankTitle { line } => write!(f, "line {line}: title is blank"),
            Self::NonPositivePrice { line } => write!(f, "line {line}: price is not positive"),
        }
    }
}

/// Result of [`Cart::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartReport {
    pub issues: Vec<CartIssue>,
}

impl CartReport {
    /// Whether no issue was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether the cart had at least one line.
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.issues.contains(&CartIssue::Empty)
    }
}
