//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BOSANOGA_API_URL` - Storefront base URL (default: `http://localhost:7070`)
//! - `BOSANOGA_API_TIMEOUT_MS` - Per-request timeout (default: 15000)
//! - `BOSANOGA_API_MAX_RETRIES` - Attempts per request, including the first (default: 3)
//! - `BOSANOGA_API_RETRY_DELAY_MS` - Base delay between attempts (default: 1000)
//! - `BOSANOGA_CART_DIR` - Directory the cart is persisted in (default: `.bosanoga`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::RetryPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:7070";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CART_DIR: &str = ".bosanoga";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Storefront base URL
    pub api_url: Url,
    /// Timeout for a single attempt
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Where [`crate::FileStorage`] keeps the cart
    pub cart_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            cart_dir: PathBuf::from(DEFAULT_CART_DIR),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `api_url` with default timings.
    #[must_use]
    pub fn for_url(api_url: Url) -> Self {
        Self {
            api_url,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let millis = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            get(key).map_or(Ok(default), |raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
        };

        let api_url = match get("BOSANOGA_API_URL") {
            Some(raw) => Url::parse(raw.trim())
                .map_err(|e| ConfigError::InvalidEnvVar("BOSANOGA_API_URL".to_string(), e.to_string()))?,
            None => Self::default().api_url,
        };

        let max_attempts = match get("BOSANOGA_API_MAX_RETRIES") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidEnvVar("BOSANOGA_API_MAX_RETRIES".to_string(), e.to_string()))?,
            None => DEFAULT_MAX_ATTEMPTS,
        };
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BOSANOGA_API_MAX_RETRIES".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            timeout: millis("BOSANOGA_API_TIMEOUT_MS", DEFAULT_TIMEOUT)?,
            retry: RetryPolicy {
                max_attempts,
                base_delay: millis("BOSANOGA_API_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY)?,
            },
            cart_dir: get("BOSANOGA_CART_DIR").map_or_else(|| PathBuf::from(DEFAULT_CART_DIR), PathBuf::from),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:7070/");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert_eq!(config.cart_dir, PathBuf::from(".bosanoga"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BOSANOGA_API_URL", "https://shop.example/"),
            ("BOSANOGA_API_TIMEOUT_MS", "250"),
            ("BOSANOGA_API_MAX_RETRIES", "1"),
            ("BOSANOGA_API_RETRY_DELAY_MS", "0"),
            ("BOSANOGA_CART_DIR", "/tmp/cart"),
        ])
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("shop.example"));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.base_delay, Duration::ZERO);
        assert_eq!(config.cart_dir, PathBuf::from("/tmp/cart"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("BOSANOGA_API_URL", "not a url")]).is_err());
        assert!(load(&[("BOSANOGA_API_TIMEOUT_MS", "soon")]).is_err());
        let err = load(&[("BOSANOGA_API_MAX_RETRIES", "0")]).unwrap_err();
        assert!(err.to_string().contains("BOSANOGA_API_MAX_RETRIES"));
    }
}
