//! Vitrine Storefront library.
//!
//! The async half of the storefront core:
//! - [`Storefront`] - the facade UI code calls
//! - [`cache`] - stale-time-aware query cache with request de-duplication
//! - [`services`] - auth, cart/wishlist ledgers and the mock backend
//! - [`queue`] - the serialized mutation queue behind each ledger
//! - [`config`], [`error`], [`telemetry`] - ambient plumbing
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_storefront::{Storefront, StorefrontConfig};
//! use vitrine_core::ProductId;
//!
//! let shop = Storefront::new(StorefrontConfig::from_env()?);
//! let cart = shop.add_to_cart(&ProductId::new("1")).await?;
//! assert_eq!(shop.cart().await?, cart);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod queue;
pub mod services;
pub mod storefront;
pub mod telemetry;

pub use cache::{QueryCache, QueryKey, QueryState, QueryStatus, QueryValue};
pub use config::{ConfigError, Latency, StaleTimes, StorefrontConfig};
pub use error::{AppError, ErrorKind, Result};
pub use services::auth::{
    AuthSession, FileTokenStore, LoginCredentials, MemoryTokenStore, Registration, TokenStore,
};
pub use storefront::Storefront;
pub use telemetry::{LogFormat, TelemetryConfig, init_tracing};
