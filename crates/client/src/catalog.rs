//! Catalog browsing state.
//!
//! A browser tracks the selected category, the search text, and the items
//! loaded so far. Each fetch is described by a [`FetchTicket`]; only the
//! most recently issued ticket may change the state, so a slow response
//! for an old filter cannot overwrite the results of a newer one.
//!
//! ```text
//! select_category / search / reload  ->  ticket (replace)
//! load_more                          ->  ticket (append), or None while
//!                                        a fetch is pending or nothing is left
//! complete(ticket, result)           ->  Applied | Stale
//! ```

use bosanoga_core::{Category, CatalogQuery, CategoryId, ProductPreview};

use crate::api::{ApiClient, ApiError, ItemsPage};

/// Title of the synthetic "every category" entry.
pub const ALL_CATEGORIES_TITLE: &str = "Все";

/// Prepend the "every category" entry to a category list.
#[must_use]
pub fn categories_with_all(categories: Vec<Category>) -> Vec<Category> {
    let mut all = Vec::with_capacity(categories.len() + 1);
    all.push(Category::new(CategoryId::ALL, ALL_CATEGORIES_TITLE));
    all.extend(categories);
    all
}

/// One issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: CatalogQuery,
    append: bool,
}

impl FetchTicket {
    /// The query to send.
    #[must_use]
    pub const fn query(&self) -> &CatalogQuery {
        &self.query
    }

    /// Whether the result extends the current list.
    #[must_use]
    pub const fn is_append(&self) -> bool {
        self.append
    }
}

/// What [`CatalogBrowser::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer ticket was issued; the result was discarded.
    Stale,
}

#[derive(Debug, Clone)]
pub struct CatalogBrowser {
    category: CategoryId,
    search: String,
    items: Vec<ProductPreview>,
    next_offset: usize,
    has_more: bool,
    error: Option<String>,
    generation: u64,
    pending: Option<u64>,
}

impl Default for CatalogBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBrowser {
    /// Every category, no search, nothing loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            category: CategoryId::ALL,
            search: String::new(),
            items: Vec::new(),
            next_offset: 0,
            has_more: false,
            error: None,
            generation: 0,
            pending: None,
        }
    }

    #[must_use]
    pub const fn category(&self) -> CategoryId {
        self.category
    }

    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn items(&self) -> &[ProductPreview] {
        &self.items
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Message of the last failed fetch, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switch category and start over from the first page.
    pub fn select_category(&mut self, category: CategoryId) -> FetchTicket {
        self.category = category;
        self.restart()
    }

    /// Change the search text and start over from the first page.
    pub fn search(&mut self, text: &str) -> FetchTicket {
        text.trim().clone_into(&mut self.search);
        self.restart()
    }

    /// Fetch the first page again with the current filters.
    pub fn reload(&mut self) -> FetchTicket {
        self.restart()
    }

    /// Fetch the following page, unless a fetch is pending or the listing is
    /// exhausted.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if self.pending.is_some() || !self.has_more {
            return None;
        }
        Some(self.issue(self.next_offset, true))
    }

    /// Apply a fetch result if its ticket is still current.
    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<ItemsPage, ApiError>) -> Outcome {
        if self.pending != Some(ticket.generation) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale catalog response"
            );
            return Outcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(page) => {
                self.has_more = page.has_more();
                self.next_offset = page.next_offset();
                if ticket.append {
                    self.items.extend(page.items);
                } else {
                    self.items = page.items;
                }
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed");
                self.error = Some(e.to_string());
            }
        }
        Outcome::Applied
    }

    /// Run `ticket` against `api` and apply the result.
    pub async fn fetch(&mut self, api: &ApiClient, ticket: &FetchTicket) -> Outcome {
        let result = api.items(ticket.query()).await;
        self.complete(ticket, result)
    }

    fn restart(&mut self) -> FetchTicket {
        self.items.clear();
        self.next_offset = 0;
        self.has_more = false;
        self.error = None;
        self.issue(0, false)
    }

    fn issue(&mut self, offset: usize, append: bool) -> FetchTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        FetchTicket {
            generation: self.generation,
            query: CatalogQuery::new(self.category, &self.search, offset),
            append,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bosanoga_core::{PAGE_SIZE, Price, ProductId};

    use super::*;

    fn previews(ids: std::ops::Range<i32>) -> Vec<ProductPreview> {
        ids.map(|id| ProductPreview {
            id: ProductId::new(id),
            category: CategoryId::new(12),
            title: format!("Туфли {id}"),
            price: Price::from_units(3000),
            old_price: None,
            images: Vec::new(),
        })
        .collect()
    }

    fn page(ticket: &FetchTicket, ids: std::ops::Range<i32>, total: usize) -> Result<ItemsPage, ApiError> {
        Ok(ItemsPage {
            items: previews(ids),
            offset: ticket.query().offset(),
            total: Some(total),
        })
    }

    #[test]
    fn test_categories_with_all() {
        let categories = categories_with_all(vec![Category::new(CategoryId::new(12), "Женская обувь")]);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories.first().unwrap().id, CategoryId::ALL);
        assert_eq!(categories.first().unwrap().title, "Все");
    }

    #[test]
    fn test_paging_appends() {
        let mut browser = CatalogBrowser::new();
        let first = browser.reload();
        assert!(browser.load_more().is_none());

        assert_eq!(browser.complete(&first, page(&first, 0..6, 8)), Outcome::Applied);
        assert!(browser.has_more());

        let second = browser.load_more().unwrap();
        assert_eq!(second.query().offset(), PAGE_SIZE);
        assert!(second.is_append());
        browser.complete(&second, page(&second, 6..8, 8));

        assert_eq!(browser.items().len(), 8);
        assert!(!browser.has_more());
        assert!(browser.load_more().is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut browser = CatalogBrowser::new();
        let old = browser.select_category(CategoryId::new(12));
        let new = browser.select_category(CategoryId::new(13));
        assert_eq!(new.query().category(), Some(CategoryId::new(13)));

        // The newer request finishes first; the older one arrives late.
        assert_eq!(browser.complete(&new, page(&new, 30..33, 3)), Outcome::Applied);
        assert_eq!(browser.complete(&old, page(&old, 20..26, 8)), Outcome::Stale);

        let ids: Vec<i32> = browser.items().iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![30, 31, 32]);
    }

    #[test]
    fn test_new_filter_invalidates_pending_load_more() {
        let mut browser = CatalogBrowser::new();
        let first = browser.reload();
        browser.complete(&first, page(&first, 0..6, 12));
        let more = browser.load_more().unwrap();

        let search = browser.search("  красный ");
        assert_eq!(search.query().search(), "красный");
        assert_eq!(browser.search_text(), "красный");
        assert!(browser.items().is_empty());

        assert_eq!(browser.complete(&more, page(&more, 6..12, 12)), Outcome::Stale);
        assert!(browser.items().is_empty());
        assert!(browser.is_loading());
    }

    #[test]
    fn test_failure_keeps_items_and_allows_retry() {
        let mut browser = CatalogBrowser::new();
        let first = browser.reload();
        browser.complete(&first, page(&first, 0..6, 12));

        let more = browser.load_more().unwrap();
        browser.complete(&more, Err(ApiError::Timeout));
        assert_eq!(browser.error(), Some("Request timeout"));
        assert_eq!(browser.items().len(), 6);
        assert!(!browser.is_loading());

        let retry = browser.load_more().unwrap();
        assert_eq!(retry.query().offset(), 6);
        browser.complete(&retry, page(&retry, 6..12, 12));
        assert!(browser.error().is_none());
        assert_eq!(browser.items().len(), 12);
    }
}
