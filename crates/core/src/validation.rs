//! Field-keyed validation shared by the cart mutators and checkout.
//!
//! Every invariant on quantities, line fields, and contact details lives
//! here so the cart state machine and the order path enforce the same rules.
//! Validators collect every problem instead of stopping at the first.

use core::fmt;

use serde::Serialize;

use crate::types::{Order, Phone, Price, ProductId};

/// Smallest quantity a cart line or order line may hold.
pub const MIN_QUANTITY: u8 = 1;

/// Largest quantity a cart line or order line may hold.
pub const MAX_QUANTITY: u8 = 10;

/// Minimum length of a delivery address, in characters.
pub const ADDRESS_MIN_LENGTH: usize = 10;

/// A single validation failure tied to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path, e.g. `phone` or `items[2].count`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{}", format_errors(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn format_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "no validation errors".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Record an error from a field name and message.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(FieldError::new(field, message));
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether an error was recorded for exactly this field.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Iterate over the recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = core::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Whether a string is empty or whitespace only.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Whether a stored quantity is within `[MIN_QUANTITY, MAX_QUANTITY]`.
#[must_use]
pub fn is_valid_quantity(count: i64) -> bool {
    (i64::from(MIN_QUANTITY)..=i64::from(MAX_QUANTITY)).contains(&count)
}

/// Clamp a requested quantity into `[MIN_QUANTITY, MAX_QUANTITY]`.
#[must_use]
pub fn clamp_quantity(count: i64) -> u8 {
    let clamped = count.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY));
    u8::try_from(clamped).unwrap_or(MAX_QUANTITY)
}

/// Validate the quantity requested when adding to the cart.
///
/// Zero and negative requests are rejected rather than applied; values above
/// the maximum are accepted here and clamped by the cart.
///
/// # Errors
///
/// Returns a `count` field error when `count < MIN_QUANTITY`.
pub fn validate_requested_quantity(count: i64) -> Result<(), FieldError> {
    if count < i64::from(MIN_QUANTITY) {
        return Err(FieldError::new(
            "count",
            format!("quantity must be at least {MIN_QUANTITY} (got {count})"),
        ));
    }
    Ok(())
}

/// Validate the descriptive fields of a cart line.
///
/// # Errors
///
/// Returns one error per blank size, blank title, or non-positive price.
pub fn validate_line_fields(title: &str, size: &str, price: Price) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(size) {
        errors.add("size", "size must be selected");
    }
    if is_blank(title) {
        errors.add("title", "title is required");
    }
    if !price.is_positive() {
        errors.add("price", "price must be positive");
    }
    errors.into_result()
}

/// Validate a contact phone.
///
/// # Errors
///
/// Returns a `phone` field error describing why [`Phone::parse`] rejected it.
pub fn validate_phone(phone: &str) -> Result<Phone, FieldError> {
    Phone::parse(phone).map_err(|e| FieldError::new("phone", e.to_string()))
}

/// Validate a delivery address (trimmed, non-empty, minimum length).
///
/// # Errors
///
/// Returns an `address` field error when the address is blank or too short.
pub fn validate_address(address: &str) -> Result<(), FieldError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("address", "address is required"));
    }
    let length = trimmed.chars().count();
    if length < ADDRESS_MIN_LENGTH {
        return Err(FieldError::new(
            "address",
            format!("address must be at least {ADDRESS_MIN_LENGTH} characters (got {length})"),
        ));
    }
    Ok(())
}

fn validate_order_line(index: usize, id: ProductId, price: Price, count: i64, errors: &mut ValidationErrors) {
    if !id.is_positive() {
        errors.add(format!("items[{index}].id"), "product id must be positive");
    }
    if !price.is_positive() {
        errors.add(format!("items[{index}].price"), "price must be positive");
    }
    if !is_valid_quantity(count) {
        errors.add(
            format!("items[{index}].count"),
            format!("quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY} (got {count})"),
        );
    }
}

/// Validate a complete order before it is submitted.
///
/// Checks the phone, the address, that there is at least one line, and every
/// line's id, price, and count.
///
/// # Errors
///
/// Returns every problem found, keyed by field.
pub fn validate_order(order: &Order) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_phone(&order.owner.phone) {
        errors.push(e);
    }
    if let Err(e) = validate_address(&order.owner.address) {
        errors.push(e);
    }
    if order.items.is_empty() {
        errors.add("items", "order must contain at least one item");
    }
    for (index, line) in order.items.iter().enumerate() {
        validate_order_line(index, line.id, line.price, line.count, &mut errors);
    }

    errors.into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{OrderLine, OrderOwner};

    fn order(phone: &str, address: &str, items: Vec<OrderLine>) -> Order {
        Order {
            owner: OrderOwner {
                phone: phone.to_string(),
                address: address.to_string(),
            },
            items,
        }
    }

    fn line(id: i32, price: i64, count: i64) -> OrderLine {
        OrderLine {
            id: ProductId::new(id),
            price: Price::from_units(price),
            count,
        }
    }

    #[test]
    fn test_valid_order() {
        let order = order(
            "+7 (999) 123-45-67",
            "Moscow, Tverskaya st. 1",
            vec![line(66, 34000, 2)],
        );
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn test_empty_phone_and_empty_items_reported_separately() {
        let errors = validate_order(&order("", "x", vec![])).unwrap_err();
        assert!(errors.has_field("phone"));
        assert!(errors.has_field("items"));

        let phone = errors.iter().find(|e| e.field == "phone").unwrap();
        let items = errors.iter().find(|e| e.field == "items").unwrap();
        assert_ne!(phone.message, items.message);
    }

    #[test]
    fn test_short_address() {
        let errors = validate_order(&order("89991234567", " short ", vec![line(1, 10, 1)]))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("address"));
    }

    #[test]
    fn test_invalid_lines_keyed_by_index() {
        let errors = validate_order(&order(
            "89991234567",
            "Moscow, Tverskaya st. 1",
            vec![line(1, 100, 1), line(0, 0, 11)],
        ))
        .unwrap_err();

        assert!(errors.has_field("items[1].id"));
        assert!(errors.has_field("items[1].price"));
        assert!(errors.has_field("items[1].count"));
        assert!(!errors.has_field("items[0].count"));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("").is_err());
        assert!(validate_address("          ").is_err());
        assert!(validate_address("Lenina 1").is_err());
        assert!(validate_address("Lenina st. 1").is_ok());
        // Length is counted in characters, not bytes.
        assert!(validate_address("ул. Ленина 1").is_ok());
    }

    #[test]
    fn test_quantity_helpers() {
        assert!(is_valid_quantity(1));
        assert!(is_valid_quantity(10));
        assert!(!is_valid_quantity(0));
        assert!(!is_valid_quantity(11));

        assert_eq!(clamp_quantity(-4), 1);
        assert_eq!(clamp_quantity(7), 7);
        assert_eq!(clamp_quantity(15), 10);

        assert!(validate_requested_quantity(1).is_ok());
        assert!(validate_requested_quantity(25).is_ok());
        assert!(validate_requested_quantity(0).is_err());
        assert!(validate_requested_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_line_fields() {
        assert!(validate_line_fields("Boots", "42", Price::from_units(1)).is_ok());

        let errors = validate_line_fields(" ", "", Price::ZERO).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("size"));
        assert!(errors.has_field("title"));
        assert!(errors.has_field("price"));
    }

    #[test]
    fn test_display_joins_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("phone", "phone is required");
        errors.add("items", "order must contain at least one item");
        assert_eq!(
            errors.to_string(),
            "phone: phone is required; items: order must contain at least one item"
        );
    }
}
