//! Integration tests for Bosa Noga.
//!
//! Each test starts the real storefront router on an ephemeral local port,
//! loaded with the bundled catalog, and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bosanoga-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Listing, search, paging, and product lookup through the client
//! - `orders` - Order validation on the server and checkout from the client
//! - `http` - Routing, CORS, and error bodies seen by a plain HTTP client

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use bosanoga_client::{ApiClient, ClientConfig, RetryPolicy};
use bosanoga_storefront::config::FaultConfig;
use bosanoga_storefront::state::AppState;
use tokio::task::JoinHandle;
use url::Url;

/// Directory holding the bundled catalog.
#[must_use]
pub fn data_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/data"))
}

/// A storefront running in the background for the duration of a test.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a storefront with the bundled catalog and no fault injection.
    ///
    /// # Panics
    ///
    /// Panics if the catalog does not load or no port can be bound.
    pub async fn start() -> Self {
        Self::start_with_faults(FaultConfig::default()).await
    }

    /// Start a storefront with the given fault injection settings.
    ///
    /// # Panics
    ///
    /// Panics if the catalog does not load or no port can be bound.
    pub async fn start_with_faults(faults: FaultConfig) -> Self {
        let state = AppState::load(&data_dir(), faults).expect("bundled catalog loads");
        let app = bosanoga_storefront::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self { addr, handle }
    }

    /// Base URL of the server.
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("valid server URL")
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Client configuration for this server with short retry delays.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_url(self.url());
        config.timeout = Duration::from_secs(5);
        config.retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
        };
        config
    }

    /// An API client for this server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.client_config()).expect("build API client")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
