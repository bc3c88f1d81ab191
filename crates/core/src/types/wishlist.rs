//! Wishlist ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Product, ProductId};

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
    /// Snapshot taken when the product was saved.
    pub product: Product,
}

/// Saved products, unique by product ID, in the order they were saved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
    count: usize,
    /// Number of effective mutations applied so far.
    #[serde(skip)]
    revision: u64,
}

impl Wishlist {
    /// An empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Increases with every change. A snapshot with a higher revision
    /// reflects every change in one with a lower revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&WishlistItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Save `product`. Already-saved products are left untouched,
    /// including their `added_at`. Returns whether an item was added.
    pub fn add(&mut self, product: &Product, added_at: DateTime<Utc>) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(WishlistItem {
            product_id: product.id.clone(),
            added_at,
            product: product.clone(),
        });
        self.count = self.items.len();
        self.revision = self.revision.wrapping_add(1);
        true
    }

    /// Unsave `product_id`. Returns whether an item was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.count = self.items.len();
        let removed = self.count != before;
        if removed {
            self.revision = self.revision.wrapping_add(1);
        }
        removed
    }

    /// Remove `product` if saved, otherwise add it. Returns whether the
    /// product is saved afterwards.
    pub fn toggle(&mut self, product: &Product, now: DateTime<Utc>) -> bool {
        if self.remove(&product.id) {
            false
        } else {
            self.add(product, now)
        }
    }
}

/// Wishlists are equal when their items are; the revision is not compared.
impl PartialEq for Wishlist {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Wishlist {}
