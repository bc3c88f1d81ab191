//! The storefront facade.
//!
//! [`Storefront`] is the in-process API that UI code calls. Reads go
//! through the [`QueryCache`]; mutations go to the mock backend and write
//! the snapshot they get back straight into the cache, so the next read of
//! that key sees the change without a round trip. A failed call writes
//! nothing.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use vitrine_core::{Cart, Catalog, Facets, ProductId, ProductList, ProductQuery, User, Wishlist};

use crate::cache::{QueryCache, QueryKey, QueryValue};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::services::auth::{
    AuthSession, FileTokenStore, LoginCredentials, MemoryTokenStore, Registration, TokenStore,
};
use crate::services::backend::MockBackend;

/// Storefront handle.
///
/// Cheaply cloneable via `Arc`; clones share the catalog, ledgers, cache
/// and session.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    backend: MockBackend,
    cache: QueryCache,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("catalog_len", &self.inner.backend.catalog().len())
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create a storefront over the seeded catalog.
    ///
    /// The token is kept in `config.token_dir` when set, in memory
    /// otherwise. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let tokens: Arc<dyn TokenStore> = match &config.token_dir {
            Some(dir) => Arc::new(FileTokenStore::new(dir)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::with_token_store(config, tokens)
    }

    /// Create a storefront over the seeded catalog with an explicit token
    /// store. `config.token_dir` is ignored.
    #[must_use]
    pub fn with_token_store(config: StorefrontConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_catalog(config, Catalog::seeded(), tokens)
    }

    /// Create a storefront over `catalog`.
    #[must_use]
    pub fn with_catalog(
        config: StorefrontConfig,
        catalog: Catalog,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let backend = MockBackend::new(Arc::new(catalog), tokens, config.latency);
        let cache = QueryCache::new(config.stale_times);
        debug!(products = backend.catalog().len(), "Storefront ready");

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                backend,
                cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.inner.backend.catalog()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Filter, sort and page the catalog immediately, bypassing the cache
    /// and the simulated latency.
    #[must_use]
    pub fn query_products(&self, query: &ProductQuery) -> ProductList {
        self.catalog().query(query)
    }

    /// Filter, sort and page the catalog through the cache, keyed by the
    /// whole query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` only if the cache holds a value of the
    /// wrong shape.
    #[instrument(skip(self, query))]
    pub async fn products(&self, query: &ProductQuery) -> Result<ProductList> {
        let backend = &self.inner.backend;
        self.inner
            .cache
            .read(QueryKey::Products(query.clone()), || async move {
                Ok(QueryValue::Products(backend.products(query).await))
            })
            .await?
            .into_products()
    }

    /// Distinct filter values and the price bounds of the catalog.
    #[must_use]
    pub fn facets(&self) -> Facets {
        self.catalog().facets()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in, persist the token and cache the shopper.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the email or password is empty or
    /// the email is malformed. Returns `AppError::Storage` if the token
    /// cannot be persisted.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession> {
        let session = self.inner.backend.login(credentials).await?;
        self.start_session(&session).await?;
        info!(user_id = %session.user.id, "User logged in");
        Ok(session)
    }

    /// Create an account, persist the token and cache the shopper.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if any field is empty or the email is
    /// malformed. Returns `AppError::Storage` if the token cannot be
    /// persisted.
    #[instrument(skip(self, registration))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession> {
        let session = self.inner.backend.register(registration).await?;
        self.start_session(&session).await?;
        info!(user_id = %session.user.id, "User registered");
        Ok(session)
    }

    async fn start_session(&self, session: &AuthSession) -> Result<()> {
        self.inner.backend.auth().persist(session)?;
        self.inner.cache.set_user(Some(session.user.clone())).await;
        Ok(())
    }

    /// Sign out: remove the token and drop every cached view.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.inner.backend.logout().await;
        self.inner.backend.auth().sign_out()?;
        self.inner.cache.clear().await;
        info!("User logged out");
        Ok(())
    }

    /// The signed-in shopper, or `None` without a stored token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token store cannot be read.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Option<User>> {
        let backend = &self.inner.backend;
        self.inner
            .cache
            .read(QueryKey::User, || async move {
                Ok(QueryValue::User(backend.current_user().await?))
            })
            .await?
            .into_user()
    }

    /// Whether a session token is stored. Never touches the cache.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token store cannot be read.
    pub fn is_signed_in(&self) -> Result<bool> {
        Ok(self.inner.backend.auth().has_token()?)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the cart ledger has shut down.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Cart> {
        let backend = &self.inner.backend;
        self.inner
            .cache
            .read(QueryKey::Cart, || async move {
                Ok(QueryValue::Cart(backend.cart().await?))
            })
            .await?
            .into_cart()
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: &ProductId) -> Result<Cart> {
        let cart = self.inner.backend.add_to_cart(product_id).await?;
        self.inner.cache.set_cart(cart.clone()).await;
        Ok(cart)
    }

    /// Remove a cart line. Absent lines are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the cart ledger has shut down.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<Cart> {
        let cart = self.inner.backend.remove_from_cart(product_id).await?;
        self.inner.cache.set_cart(cart.clone()).await;
        Ok(cart)
    }

    /// Set the exact quantity of a cart line; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is unknown or not in the
    /// cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_cart_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<Cart> {
        let cart = self
            .inner
            .backend
            .set_cart_quantity(product_id, quantity)
            .await?;
        self.inner.cache.set_cart(cart.clone()).await;
        Ok(cart)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the wishlist ledger has shut down.
    #[instrument(skip(self))]
    pub async fn wishlist(&self) -> Result<Wishlist> {
        let backend = &self.inner.backend;
        self.inner
            .cache
            .read(QueryKey::Wishlist, || async move {
                Ok(QueryValue::Wishlist(backend.wishlist().await?))
            })
            .await?
            .into_wishlist()
    }

    /// Save a product. Already saved products keep their timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<Wishlist> {
        let wishlist = self.inner.backend.add_to_wishlist(product_id).await?;
        self.inner.cache.set_wishlist(wishlist.clone()).await;
        Ok(wishlist)
    }

    /// Unsave a product. Absent products are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the wishlist ledger has shut down.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<Wishlist> {
        let wishlist = self.inner.backend.remove_from_wishlist(product_id).await?;
        self.inner.cache.set_wishlist(wishlist.clone()).await;
        Ok(wishlist)
    }

    /// Save the product if it is not saved, unsave it otherwise.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle_wishlist(&self, product_id: &ProductId) -> Result<Wishlist> {
        let wishlist = self.inner.backend.toggle_wishlist(product_id).await?;
        self.inner.cache.set_wishlist(wishlist.clone()).await;
        Ok(wishlist)
    }
}
