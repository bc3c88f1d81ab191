//! In-process mock backend.
//!
//! Stands in for a remote commerce API: every call answers from the
//! catalog, the ledgers or the auth service and takes its configured
//! [`Latency`] to do so. Nothing here touches the query cache.
//!
//! Ledger calls enqueue their mutation first and sleep afterwards, so the
//! order calls are issued in is the order they apply in, whatever their
//! individual delays.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use vitrine_core::{Cart, Catalog, ProductId, ProductList, ProductQuery, User, Wishlist};

use super::auth::{AuthService, AuthSession, LoginCredentials, Registration, TokenStore};
use super::ledger::{CartLedger, WishlistLedger};
use crate::config::Latency;
use crate::error::Result;

/// Mock backend.
#[derive(Debug)]
pub struct MockBackend {
    catalog: Arc<Catalog>,
    cart: CartLedger,
    wishlist: WishlistLedger,
    auth: AuthService,
    latency: Latency,
}

impl MockBackend {
    /// Create a backend with empty ledgers. Must be called inside a tokio
    /// runtime.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, tokens: Arc<dyn TokenStore>, latency: Latency) -> Self {
        Self {
            cart: CartLedger::spawn(Arc::clone(&catalog)),
            wishlist: WishlistLedger::spawn(Arc::clone(&catalog)),
            auth: AuthService::new(tokens),
            catalog,
            latency,
        }
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The authentication service.
    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Filter, sort and page the catalog.
    #[instrument(skip(self, query))]
    pub async fn products(&self, query: &ProductQuery) -> ProductList {
        delay(self.latency.products).await;
        let list = self.catalog.query(query);
        debug!(total = list.total, "Products queried");
        list
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Validation` for missing or malformed credentials.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession> {
        delay(self.latency.login).await;
        Ok(self.auth.login(credentials)?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for missing or malformed details.
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession> {
        delay(self.latency.register).await;
        Ok(self.auth.register(registration)?)
    }

    /// Server side of sign-out. Always succeeds.
    pub async fn logout(&self) {
        delay(self.latency.logout).await;
    }

    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token store cannot be read.
    pub async fn current_user(&self) -> Result<Option<User>> {
        delay(self.latency.current_user).await;
        Ok(self.auth.current_user()?)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the cart ledger has shut down.
    pub async fn cart(&self) -> Result<Cart> {
        let outcome = self.cart.snapshot().await;
        delay(self.latency.get_cart).await;
        outcome
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    pub async fn add_to_cart(&self, product_id: &ProductId) -> Result<Cart> {
        let outcome = self.cart.add(product_id).await;
        delay(self.latency.add_to_cart).await;
        outcome
    }

    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the cart ledger has shut down.
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<Cart> {
        let outcome = self.cart.remove(product_id).await;
        delay(self.latency.update_cart).await;
        outcome
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is unknown or not in the cart.
    pub async fn set_cart_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<Cart> {
        let outcome = self.cart.set_quantity(product_id, quantity).await;
        delay(self.latency.update_cart).await;
        outcome
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the wishlist ledger has shut down.
    pub async fn wishlist(&self) -> Result<Wishlist> {
        let outcome = self.wishlist.snapshot().await;
        delay(self.latency.get_wishlist).await;
        outcome
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    pub async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<Wishlist> {
        let outcome = self.wishlist.add(product_id).await;
        delay(self.latency.add_to_wishlist).await;
        outcome
    }

    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the wishlist ledger has shut down.
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<Wishlist> {
        let outcome = self.wishlist.remove(product_id).await;
        delay(self.latency.remove_from_wishlist).await;
        outcome
    }

    /// Toggle membership. Takes the longer of the add and remove delays.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    pub async fn toggle_wishlist(&self, product_id: &ProductId) -> Result<Wishlist> {
        let outcome = self.wishlist.toggle(product_id).await;
        delay(self.latency.add_to_wishlist.max(self.latency.remove_from_wishlist)).await;
        outcome
    }
}

async fn delay(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
