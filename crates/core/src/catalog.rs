//! In-memory catalog store and query engine.
//!
//! The catalog is loaded once from two JSON documents (categories and
//! products) and never mutated afterwards. Queries filter the product list in
//! source order and cut fixed-size pages out of the result.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::types::{Category, CategoryId, Product, ProductId, ProductPreview};
use crate::validation::is_blank;

/// Number of products returned per catalog page.
pub const PAGE_SIZE: usize = 6;

/// Products featured in the "top sales" block.
pub const TOP_SALE_IDS: [ProductId; 3] = [
    ProductId::new(66),
    ProductId::new(65),
    ProductId::new(73),
];

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A document is not valid JSON or does not match the expected schema.
    #[error("failed to parse {document}: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Two products share the same id.
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),

    /// Two categories share the same id.
    #[error("duplicate category id {0}")]
    DuplicateCategory(CategoryId),

    /// A product references a category that does not exist.
    #[error("product {product} references unknown category {category}")]
    UnknownCategory {
        product: ProductId,
        category: CategoryId,
    },

    /// A product has a blank title or a non-positive price.
    #[error("product {product} is invalid: {reason}")]
    InvalidProduct {
        product: ProductId,
        reason: &'static str,
    },
}

/// Parameters of a product listing query.
///
/// The search text is normalized (trimmed and lowercased) on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    category: Option<CategoryId>,
    search: String,
    offset: usize,
}

impl CatalogQuery {
    /// Build a query. A category id of 0 or below means "all categories".
    #[must_use]
    pub fn new(category: CategoryId, search: &str, offset: usize) -> Self {
        Self {
            category: category.is_positive().then_some(category),
            search: search.trim().to_lowercase(),
            offset,
        }
    }

    /// A query for the first page of everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Category filter, if any.
    #[must_use]
    pub const fn category(&self) -> Option<CategoryId> {
        self.category
    }

    /// Normalized search text (possibly empty).
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Offset of the first item of the page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category
            && product.category != category
        {
            return false;
        }
        self.search.is_empty() || matches_search(product, &self.search)
    }
}

/// Search rule: exact (case-insensitive) color match, or substring match on
/// title, manufacturer, or material. `needle` must already be lowercased.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.color.to_lowercase() == needle
        || product.title.to_lowercase().contains(needle)
        || product.manufacturer.to_lowercase().contains(needle)
        || product.material.to_lowercase().contains(needle)
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items of this page, in source order.
    pub items: Vec<T>,
    /// Offset of the first item.
    pub offset: usize,
    /// Number of items matching the filter across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Whether more matching items exist past this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.items.len()) < self.total
    }

    /// Offset of the next page.
    #[must_use]
    pub fn next_offset(&self) -> usize {
        self.offset.saturating_add(self.items.len())
    }
}

/// The product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from already-decoded records.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate ids, dangling category references,
    /// blank titles, or non-positive prices.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut category_ids = HashSet::new();
        for category in &categories {
            if !category_ids.insert(category.id) {
                return Err(CatalogError::DuplicateCategory(category.id));
            }
        }

        let mut product_ids = HashSet::new();
        for product in &products {
            if !product_ids.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
            if !category_ids.contains(&product.category) {
                return Err(CatalogError::UnknownCategory {
                    product: product.id,
                    category: product.category,
                });
            }
            if is_blank(&product.title) {
                return Err(CatalogError::InvalidProduct {
                    product: product.id,
                    reason: "title is blank",
                });
            }
            if !product.price.is_positive() {
                return Err(CatalogError::InvalidProduct {
                    product: product.id,
                    reason: "price is not positive",
                });
            }
        }

        Ok(Self {
            categories,
            products,
        })
    }

    /// Parse a catalog from the categories and products JSON documents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed documents, or any error
    /// from [`Catalog::new`].
    pub fn from_json(categories: &str, products: &str) -> Result<Self, CatalogError> {
        let categories = serde_json::from_str(categories).map_err(|source| CatalogError::Parse {
            document: "categories",
            source,
        })?;
        let products = serde_json::from_str(products).map_err(|source| CatalogError::Parse {
            document: "products",
            source,
        })?;
        Self::new(categories, products)
    }

    /// All categories, in source order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of products.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Featured products, in source order (not allow-list order).
    #[must_use]
    pub fn top_sales(&self) -> Vec<ProductPreview> {
        self.products
            .iter()
            .filter(|product| TOP_SALE_IDS.contains(&product.id))
            .map(ProductPreview::from)
            .collect()
    }

    /// Run a listing query and return one page of previews.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Page<ProductPreview> {
        let matching: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| query.matches(product))
            .collect();

        let items = matching
            .iter()
            .skip(query.offset)
            .take(PAGE_SIZE)
            .map(|product| ProductPreview::from(*product))
            .collect();

        Page {
            items,
            offset: query.offset,
            total: matching.len(),
        }
    }

    /// Look up a full product record.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }
}
