//! Cart and wishlist ledgers.
//!
//! Each ledger owns its state inside a [`MutationQueue`], so mutations on
//! the same ledger apply one at a time in submission order. Product ids
//! are resolved against the catalog before a mutation is enqueued; the
//! catalog never changes, so the lookup cannot go stale.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use vitrine_core::{Cart, Catalog, LedgerError, Product, ProductId, Wishlist};

use crate::error::{AppError, Result};
use crate::queue::MutationQueue;

fn lookup(catalog: &Catalog, product_id: &ProductId) -> Result<Product> {
    catalog
        .get(product_id)
        .cloned()
        .ok_or_else(|| AppError::from(LedgerError::ProductNotFound(product_id.clone())))
}

// =============================================================================
// Cart
// =============================================================================

/// Shopping cart ledger.
#[derive(Debug, Clone)]
pub struct CartLedger {
    catalog: Arc<Catalog>,
    queue: MutationQueue<Cart>,
}

impl CartLedger {
    /// Start an empty cart. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            queue: MutationQueue::spawn("cart", Cart::new()),
        }
    }

    /// Current cart, after every earlier mutation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the ledger has shut down.
    pub async fn snapshot(&self) -> Result<Cart> {
        Ok(self.queue.apply(|cart| cart.clone()).await?)
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> Result<Cart> {
        let product = lookup(&self.catalog, product_id)?;
        let cart = self
            .queue
            .apply(move |cart| {
                cart.add(&product);
                cart.clone()
            })
            .await?;
        debug!(item_count = cart.item_count(), "Cart line added");
        Ok(cart)
    }

    /// Remove a line. Removing an absent line returns the unchanged cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the ledger has shut down.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<Cart> {
        let product_id = product_id.clone();
        let (removed, cart) = self
            .queue
            .apply(move |cart| (cart.remove(&product_id), cart.clone()))
            .await?;
        debug!(removed, item_count = cart.item_count(), "Cart line removed");
        Ok(cart)
    }

    /// Set the exact quantity of a line; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is unknown or not in the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<Cart> {
        lookup(&self.catalog, product_id)?;
        let product_id = product_id.clone();
        let cart = self
            .queue
            .apply(move |cart| {
                cart.set_quantity(&product_id, quantity)?;
                Ok::<_, LedgerError>(cart.clone())
            })
            .await??;
        debug!(item_count = cart.item_count(), "Cart quantity set");
        Ok(cart)
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// Wishlist ledger.
#[derive(Debug, Clone)]
pub struct WishlistLedger {
    catalog: Arc<Catalog>,
    queue: MutationQueue<Wishlist>,
}

impl WishlistLedger {
    /// Start an empty wishlist. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            queue: MutationQueue::spawn("wishlist", Wishlist::new()),
        }
    }

    /// Current wishlist, after every earlier mutation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the ledger has shut down.
    pub async fn snapshot(&self) -> Result<Wishlist> {
        Ok(self.queue.apply(|wishlist| wishlist.clone()).await?)
    }

    /// Save a product. Saving it again keeps the original timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> Result<Wishlist> {
        let product = lookup(&self.catalog, product_id)?;
        let (added, wishlist) = self
            .queue
            .apply(move |wishlist| (wishlist.add(&product, Utc::now()), wishlist.clone()))
            .await?;
        debug!(added, count = wishlist.count(), "Wishlist add");
        Ok(wishlist)
    }

    /// Unsave a product. Unknown or absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the ledger has shut down.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<Wishlist> {
        let product_id = product_id.clone();
        let (removed, wishlist) = self
            .queue
            .apply(move |wishlist| (wishlist.remove(&product_id), wishlist.clone()))
            .await?;
        debug!(removed, count = wishlist.count(), "Wishlist remove");
        Ok(wishlist)
    }

    /// Remove the product if saved, otherwise save it. The check and the
    /// change happen in one queued mutation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(&self, product_id: &ProductId) -> Result<Wishlist> {
        let product = lookup(&self.catalog, product_id)?;
        let (saved, wishlist) = self
            .queue
            .apply(move |wishlist| (wishlist.toggle(&product, Utc::now()), wishlist.clone()))
            .await?;
        debug!(saved, count = wishlist.count(), "Wishlist toggle");
        Ok(wishlist)
    }
}
