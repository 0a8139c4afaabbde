//! HTTP client for the storefront API.
//!
//! Every request gets a per-attempt timeout. Network failures, timeouts, and
//! 5xx answers are retried with a linear backoff; 4xx answers are returned
//! immediately. Empty query parameters are never put on the wire.

use std::sync::Arc;
use std::time::Duration;

use bosanoga_core::{
    Category, CatalogQuery, Order, PAGE_SIZE, Product, ProductId, ProductPreview,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::{ClientConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

/// Response header carrying the number of matches behind a listing.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

// =============================================================================
// Errors
// =============================================================================

/// Errors from storefront API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The attempt did not finish within the configured timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection-level failure (refused, reset, DNS).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The resource does not exist (HTTP 404).
    #[error("Not found")]
    NotFound,

    /// Any other non-success status. `message` is the server's `error`
    /// field when it sent one.
    #[error("HTTP error! status: {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

impl ApiError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::NotFound | Self::Decode(_) | Self::Url(_) => false,
        }
    }

    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

// =============================================================================
// Retry policy
// =============================================================================

/// Linear backoff: the wait after attempt `n` is `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.max(1))
    }
}

// =============================================================================
// Responses
// =============================================================================

/// One page of the item listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsPage {
    pub items: Vec<ProductPreview>,
    pub offset: usize,
    /// Match count reported by the server, when it sent one.
    pub total: Option<usize>,
}

impl ItemsPage {
    /// Whether a following page exists.
    ///
    /// Without a reported total, a full page is taken to mean there may be
    /// more.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total.map_or(self.items.len() == PAGE_SIZE, |total| {
            self.offset + self.items.len() < total
        })
    }

    /// Offset of the following page.
    #[must_use]
    pub fn next_offset(&self) -> usize {
        self.offset + self.items.len()
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub categories: usize,
    pub products: usize,
}

// =============================================================================
// Client
// =============================================================================

/// Storefront API client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;

        // Relative joins keep any path prefix of the base URL.
        let mut base = config.api_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base,
                retry: config.retry,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Fetch all categories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.url("api/categories")?;
        self.get_json(url).await
    }

    /// Fetch the featured products.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn top_sales(&self) -> Result<Vec<ProductPreview>, ApiError> {
        let url = self.url("api/top-sales")?;
        self.get_json(url).await
    }

    /// Fetch one page of the item listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` once retries are exhausted.
    #[instrument(skip(self), fields(category = ?query.category(), offset = query.offset()))]
    pub async fn items(&self, query: &CatalogQuery) -> Result<ItemsPage, ApiError> {
        let url = self.items_url(query)?;
        let response = self.send(|| self.inner.http.get(url.clone())).await?;

        let total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
        let items = response.json::<Vec<ProductPreview>>().await?;

        Ok(ItemsPage {
            items,
            offset: query.offset(),
            total,
        })
    }

    /// Fetch a full product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or another `ApiError`
    /// once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let url = self.url(&format!("api/items/{id}"))?;
        self.get_json(url).await
    }

    /// Submit an order. The server answers 204 with no body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the server rejects the order shape,
    /// or another `ApiError` once retries are exhausted.
    #[instrument(skip_all, fields(lines = order.items.len()))]
    pub async fn submit_order(&self, order: &Order) -> Result<(), ApiError> {
        let url = self.url("api/order")?;
        self.send(|| self.inner.http.post(url.clone()).json(order))
            .await?;
        tracing::info!("Order accepted");
        Ok(())
    }

    /// Probe the server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` once retries are exhausted.
    pub async fn health(&self) -> Result<Health, ApiError> {
        let url = self.url("health")?;
        self.get_json(url).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path)?)
    }

    /// Listing URL; the category, offset and search are only added when set.
    fn items_url(&self, query: &CatalogQuery) -> Result<Url, ApiError> {
        let mut url = self.url("api/items")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(category) = query.category() {
                pairs.append_pair("categoryId", &category.to_string());
            }
            if query.offset() > 0 {
                pairs.append_pair("offset", &query.offset().to_string());
            }
            if !query.search().is_empty() {
                pairs.append_pair("q", query.search());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.send(|| self.inner.http.get(url.clone())).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send a request, retrying transient failures.
    async fn send<F>(&self, build: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let policy = self.inner.retry;
        let mut attempt = 1;

        loop {
            let result = match build().send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(ApiError::from(e)),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        ?delay,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "Request failed");
                    return Err(e);
                }
                Ok(response) => return Ok(response),
            }
        }
    }
}

/// Map non-success statuses to errors, keeping the server's message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    Err(ApiError::Status { status, message })
}
