//! Order payloads exchanged between checkout and the order endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;

/// Shape errors detected when decoding an order request body.
///
/// These are structural checks only (field presence and JSON types). Contact
/// format and quantity ranges are checked client-side by
/// [`crate::validation::validate_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderShapeError {
    /// `owner.phone` or `owner.address` is missing or not a string.
    #[error("Invalid owner data")]
    InvalidOwner,
    /// `items` is not an array, or an element lacks a numeric id/price/count.
    #[error("Invalid items format")]
    InvalidItems,
}

/// Contact details of the person placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOwner {
    pub phone: String,
    pub address: String,
}

/// One ordered product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub price: Price,
    pub count: i64,
}

/// An order as sent to `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub owner: OrderOwner,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Decode an order from an already-parsed JSON body.
    ///
    /// A missing `owner` is treated as an empty object (and therefore fails
    /// the owner check); a missing `items` is treated as an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`OrderShapeError::InvalidOwner`] when the phone or address is
    /// not a string, and [`OrderShapeError::InvalidItems`] when the items are
    /// not an array of `{id, price, count}` objects with numeric fields.
    pub fn from_wire(body: &Value) -> Result<Self, OrderShapeError> {
        let owner = parse_owner(body.get("owner"))?;
        let items = match body.get("items") {
            None => Vec::new(),
            Some(Value::Array(lines)) => lines
                .iter()
                .map(parse_line)
                .collect::<Option<Vec<_>>>()
                .ok_or(OrderShapeError::InvalidItems)?,
            Some(_) => return Err(OrderShapeError::InvalidItems),
        };

        Ok(Self { owner, items })
    }

    /// Sum of `price * count` over all lines (non-positive counts contribute
    /// nothing).
    #[must_use]
    pub fn total(&self) -> Price {
        self.items
            .iter()
            .map(|line| line.price.times(u32::try_from(line.count).unwrap_or(0)))
            .sum()
    }
}

fn parse_owner(owner: Option<&Value>) -> Result<OrderOwner, OrderShapeError> {
    let field = |name: &str| {
        owner
            .and_then(|o| o.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(OrderShapeError::InvalidOwner)
    };

    Ok(OrderOwner {
        phone: field("phone")?,
        address: field("address")?,
    })
}

fn parse_line(line: &Value) -> Option<OrderLine> {
    let id = line
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())?;
    let price = match line.get("price")? {
        Value::Number(n) => Price::from_json_number(n)?,
        _ => return None,
    };
    let count = line.get("count").and_then(Value::as_i64)?;

    Some(OrderLine {
        id: ProductId::new(id),
        price,
        count,
    })
}
