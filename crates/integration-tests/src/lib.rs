//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart` - Cart ledger through the storefront and its cache
//! - `wishlist` - Wishlist ledger, idempotency and toggling
//! - `auth` - Login, registration, logout and token persistence
//! - `products` - Catalog filtering, sorting and cached product views
//!
//! Helpers here build a [`Storefront`] wired the way each test needs it.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;

use vitrine_core::ProductId;
use vitrine_storefront::{FileTokenStore, Storefront, StorefrontConfig};

/// Storefront with no simulated latency and an in-memory token.
#[must_use]
pub fn storefront() -> Storefront {
    Storefront::new(StorefrontConfig::without_latency())
}

/// Storefront with the default simulated latency. Use under paused time.
#[must_use]
pub fn storefront_with_latency() -> Storefront {
    Storefront::new(StorefrontConfig::default())
}

/// Storefront with no simulated latency that keeps its token in `dir`.
#[must_use]
pub fn file_backed_storefront(dir: &Path) -> Storefront {
    Storefront::with_token_store(
        StorefrontConfig::without_latency(),
        Arc::new(FileTokenStore::new(dir)),
    )
}

/// Shorthand for a product id.
#[must_use]
pub fn id(raw: &str) -> ProductId {
    ProductId::new(raw)
}

/// Ids of a product list, in order.
#[must_use]
pub fn ids(products: &[vitrine_core::Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}
