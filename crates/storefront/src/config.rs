//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BOSANOGA_HOST` - Bind address (default: 127.0.0.1)
//! - `BOSANOGA_PORT` - Listen port (default: 7070)
//! - `BOSANOGA_DATA_DIR` - Directory holding `categories.json` and
//!   `products.json` (default: `crates/storefront/data`)
//! - `APP_ERROR` - `true` to fail a random 20% of requests with a 500
//! - `APP_DELAY` - `true` to sleep a random duration before each request
//! - `APP_DELAY_MIN_MS` - Lower bound of the artificial delay (default: 100)
//! - `APP_DELAY_MAX_MS` - Upper bound of the artificial delay (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fraction of requests failed when fault injection is on.
pub const DEFAULT_ERROR_RATE: f64 = 0.2;

const DEFAULT_DELAY_MIN_MS: u64 = 100;
const DEFAULT_DELAY_MAX_MS: u64 = 3000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory with the catalog JSON documents
    pub data_dir: PathBuf,
    /// Diagnostic fault injection
    pub faults: FaultConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Fault injection toggles. Both are off by default.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    /// Fail a random fraction of requests with a 500.
    pub error: bool,
    /// Fraction of requests to fail when `error` is set.
    pub error_rate: f64,
    /// Sleep a random duration in this range before handling.
    pub delay: Option<DelayRange>,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            error: false,
            error_rate: DEFAULT_ERROR_RATE,
            delay: None,
        }
    }
}

impl FaultConfig {
    /// Whether any fault mode is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.error || self.delay.is_some()
    }
}

/// Inclusive range of artificial delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// Create a range, rejecting `min > max`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("BOSANOGA_HOST", "127.0.0.1")?;
        let port = env.parse_or("BOSANOGA_PORT", "7070")?;
        let data_dir = PathBuf::from(env.get_or_default("BOSANOGA_DATA_DIR", "crates/storefront/data"));
        let faults = FaultConfig::from_env(&env)?;

        let sentry_dsn = env.get_optional("SENTRY_DSN");
        let sentry_environment = env.get_optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .get_optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .get_optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            data_dir,
            faults,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FaultConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let error = env.flag("APP_ERROR")?;
        let delay = if env.flag("APP_DELAY")? {
            let min: u64 = env.parse_or("APP_DELAY_MIN_MS", &DEFAULT_DELAY_MIN_MS.to_string())?;
            let max: u64 = env.parse_or("APP_DELAY_MAX_MS", &DEFAULT_DELAY_MAX_MS.to_string())?;
            let range = DelayRange::new(Duration::from_millis(min), Duration::from_millis(max))
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "APP_DELAY_MIN_MS".to_string(),
                        format!("must not exceed APP_DELAY_MAX_MS ({min} > {max})"),
                    )
                })?;
            Some(range)
        } else {
            None
        };

        Ok(Self {
            error,
            error_rate: DEFAULT_ERROR_RATE,
            delay,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Empty values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse an on/off toggle. Unset means off.
    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        let Some(value) = self.get_optional(key) else {
            return Ok(false);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected true or false, got {other:?}"),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:7070");
        assert_eq!(config.data_dir, PathBuf::from("crates/storefront/data"));
        assert_eq!(config.faults, FaultConfig::default());
        assert!(!config.faults.is_active());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_host_and_port() {
        let config = load(&[("BOSANOGA_HOST", "0.0.0.0"), ("BOSANOGA_PORT", "8080")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("BOSANOGA_PORT", "seventy")]).unwrap_err();
        assert!(err.to_string().contains("BOSANOGA_PORT"));
    }

    #[test]
    fn test_fault_flags() {
        let config = load(&[("APP_ERROR", "true"), ("APP_DELAY", "TRUE")]).unwrap();
        assert!(config.faults.error);
        assert_eq!(
            config.faults.delay,
            DelayRange::new(Duration::from_millis(100), Duration::from_millis(3000))
        );

        let config = load(&[("APP_ERROR", "false")]).unwrap();
        assert!(!config.faults.error);

        assert!(load(&[("APP_ERROR", "sometimes")]).is_err());
    }

    #[test]
    fn test_delay_bounds() {
        let config = load(&[
            ("APP_DELAY", "1"),
            ("APP_DELAY_MIN_MS", "0"),
            ("APP_DELAY_MAX_MS", "5"),
        ])
        .unwrap();
        let delay = config.faults.delay.unwrap();
        assert_eq!(delay.min, Duration::ZERO);
        assert_eq!(delay.max, Duration::from_millis(5));

        // Bounds are ignored while the delay is off.
        assert!(load(&[("APP_DELAY_MIN_MS", "x")]).is_ok());

        let err = load(&[
            ("APP_DELAY", "true"),
            ("APP_DELAY_MIN_MS", "50"),
            ("APP_DELAY_MAX_MS", "10"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "APP_DELAY_MIN_MS"));
    }
}
