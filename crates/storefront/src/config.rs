//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `VITRINE_STALE_PRODUCTS_SECS` - Product listing stale time (default: 300)
//! - `VITRINE_STALE_CART_SECS` - Cart stale time (default: 120)
//! - `VITRINE_STALE_WISHLIST_SECS` - Wishlist stale time (default: 300)
//! - `VITRINE_STALE_USER_SECS` - Current user stale time (default: 600)
//! - `VITRINE_SIMULATE_LATENCY` - Apply mock backend delays (default: true)
//! - `VITRINE_TOKEN_DIR` - Directory for the durable auth token (default: in-memory)
//! - `VITRINE_LOG` - Default tracing directive when `RUST_LOG` is unset (default: info)
//! - `VITRINE_LOG_FORMAT` - `compact` or `json` (default: compact)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::telemetry::{LogFormat, TelemetryConfig};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    /// Per-key stale times for the query cache
    pub stale_times: StaleTimes,
    /// Artificial delays applied by the mock backend
    pub latency: Latency,
    /// Where the auth token is persisted; `None` keeps it in memory
    pub token_dir: Option<PathBuf>,
    /// Logging setup
    pub telemetry: TelemetryConfig,
}

/// How long each kind of cached read stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTimes {
    pub products: Duration,
    pub cart: Duration,
    pub wishlist: Duration,
    pub user: Duration,
}

impl Default for StaleTimes {
    fn default() -> Self {
        Self {
            products: Duration::from_secs(5 * 60),
            cart: Duration::from_secs(2 * 60),
            wishlist: Duration::from_secs(5 * 60),
            user: Duration::from_secs(10 * 60),
        }
    }
}

/// Simulated network delay for each mock backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub products: Duration,
    pub login: Duration,
    pub register: Duration,
    pub logout: Duration,
    pub current_user: Duration,
    pub get_cart: Duration,
    pub add_to_cart: Duration,
    pub update_cart: Duration,
    pub get_wishlist: Duration,
    pub add_to_wishlist: Duration,
    pub remove_from_wishlist: Duration,
}

impl Latency {
    /// No delays at all. Used by tests.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            products: Duration::ZERO,
            login: Duration::ZERO,
            register: Duration::ZERO,
            logout: Duration::ZERO,
            current_user: Duration::ZERO,
            get_cart: Duration::ZERO,
            add_to_cart: Duration::ZERO,
            update_cart: Duration::ZERO,
            get_wishlist: Duration::ZERO,
            add_to_wishlist: Duration::ZERO,
            remove_from_wishlist: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            products: Duration::from_millis(500),
            login: Duration::from_millis(1000),
            register: Duration::from_millis(1200),
            logout: Duration::from_millis(300),
            current_user: Duration::from_millis(400),
            get_cart: Duration::from_millis(300),
            add_to_cart: Duration::from_millis(400),
            update_cart: Duration::from_millis(300),
            get_wishlist: Duration::from_millis(300),
            add_to_wishlist: Duration::from_millis(400),
            remove_from_wishlist: Duration::from_millis(300),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = StaleTimes::default();
        let stale_times = StaleTimes {
            products: get_secs_or("VITRINE_STALE_PRODUCTS_SECS", defaults.products)?,
            cart: get_secs_or("VITRINE_STALE_CART_SECS", defaults.cart)?,
            wishlist: get_secs_or("VITRINE_STALE_WISHLIST_SECS", defaults.wishlist)?,
            user: get_secs_or("VITRINE_STALE_USER_SECS", defaults.user)?,
        };

        let latency = if get_parsed_or("VITRINE_SIMULATE_LATENCY", true)? {
            Latency::default()
        } else {
            Latency::none()
        };

        let token_dir = get_optional_env("VITRINE_TOKEN_DIR").map(PathBuf::from);

        let telemetry = TelemetryConfig {
            default_directive: get_env_or_default("VITRINE_LOG", "info"),
            format: get_parsed_or("VITRINE_LOG_FORMAT", LogFormat::Compact)?,
        };

        Ok(Self {
            stale_times,
            latency,
            token_dir,
            telemetry,
        })
    }

    /// Default configuration with every simulated delay removed.
    #[must_use]
    pub fn without_latency() -> Self {
        Self {
            latency: Latency::none(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a whole number of seconds, falling back to `default` when unset.
fn get_secs_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        parse_value::<u64>(key, &raw).map(Duration::from_secs)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stale_times() {
        let stale = StaleTimes::default();
        assert_eq!(stale.products, Duration::from_secs(300));
        assert_eq!(stale.cart, Duration::from_secs(120));
        assert_eq!(stale.wishlist, Duration::from_secs(300));
        assert_eq!(stale.user, Duration::from_secs(600));
    }

    #[test]
    fn test_default_latency_matches_mock_api() {
        let latency = Latency::default();
        assert_eq!(latency.products, Duration::from_millis(500));
        assert_eq!(latency.register, Duration::from_millis(1200));
        assert_eq!(latency.add_to_wishlist, Duration::from_millis(400));
    }

    #[test]
    fn test_without_latency() {
        let config = StorefrontConfig::without_latency();
        assert_eq!(config.latency, Latency::none());
        assert_eq!(config.stale_times, StaleTimes::default());
        assert!(config.token_dir.is_none());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u64>("VITRINE_STALE_CART_SECS", "soon").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "VITRINE_STALE_CART_SECS"));

        assert!(parse_value::<bool>("VITRINE_SIMULATE_LATENCY", " false ").is_ok());
        let format: LogFormat = parse_value("VITRINE_LOG_FORMAT", "json").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
