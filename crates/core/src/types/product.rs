//! Catalog records: products, sizes, and categories.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A size offered for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Size label, e.g. `"38"` or `"18 US"`.
    pub size: String,
    /// Whether this size can be ordered.
    pub available: bool,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
}

impl Category {
    /// Create a category.
    #[must_use]
    pub fn new(id: CategoryId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Full product record, as stored in the catalog and returned by the detail
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub category: CategoryId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Price>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub sizes: Vec<Size>,
}

impl Product {
    /// Project the product into its list-view shape.
    #[must_use]
    pub fn preview(&self) -> ProductPreview {
        ProductPreview::from(self)
    }

    /// Sizes that can currently be ordered, in catalog order.
    pub fn available_sizes(&self) -> impl Iterator<Item = &Size> {
        self.sizes.iter().filter(|size| size.available)
    }

    /// Whether at least one size can be ordered.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.available_sizes().next().is_some()
    }

    /// Look up a size by its label.
    #[must_use]
    pub fn size(&self, label: &str) -> Option<&Size> {
        self.sizes.iter().find(|size| size.size == label)
    }

    /// First image URL, used as the cart thumbnail.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Reduced product projection used by list views (catalog, top sales).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPreview {
    pub id: ProductId,
    pub category: CategoryId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Price>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<&Product> for ProductPreview {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            category: product.category,
            title: product.title.clone(),
            price: product.price,
            old_price: product.old_price,
            images: product.images.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn boots() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 10,
            "category": 1,
            "title": "Red Boots",
            "price": 100,
            "oldPrice": 150,
            "images": ["https://cdn.example/red-boots.jpg"],
            "color": "red",
            "sizes": [
                {"size": "41", "available": false},
                {"size": "42", "available": true}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_defaults_missing_attributes() {
        let product = boots();
        assert_eq!(product.id, ProductId::new(10));
        assert_eq!(product.old_price, Some(Price::from_units(150)));
        assert!(product.manufacturer.is_empty());
        assert!(product.season.is_empty());
    }

    #[test]
    fn test_preview_shape() {
        let preview = serde_json::to_value(boots().preview()).unwrap();
        let object = preview.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["category", "id", "images", "oldPrice", "price", "title"]
        );
    }

    #[test]
    fn test_available_sizes() {
        let product = boots();
        let labels: Vec<&str> = product.available_sizes().map(|s| s.size.as_str()).collect();
        assert_eq!(labels, ["42"]);
        assert!(product.is_orderable());
        assert!(product.size("41").is_some());
        assert!(product.size("40").is_none());
    }

    #[test]
    fn test_not_orderable_without_available_sizes() {
        let mut product = boots();
        for size in &mut product.sizes {
            size.available = false;
        }
        assert!(!product.is_orderable());

        product.sizes.clear();
        assert!(!product.is_orderable());
    }
}
