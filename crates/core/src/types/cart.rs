//! Shopping cart ledger.
//!
//! `item_count` and `total` are recomputed from the line items after every
//! mutation; they are never patched incrementally.

use serde::Serialize;

use super::{Price, Product, ProductId};
use crate::error::LedgerError;

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u32,
    /// Snapshot taken when the line was created.
    pub product: Product,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The shopper's cart. Lines are unique by product ID and kept in the
/// order they were first added.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
    item_count: u64,
    /// Number of mutations applied so far.
    #[serde(skip)]
    revision: u64,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of line totals.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Sum of quantities.
    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Increases with every mutation. A snapshot with a higher revision
    /// reflects every change in one with a lower revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Add one unit of `product`, creating the line if needed.
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem {
                product_id: product.id.clone(),
                quantity: 1,
                product: product.clone(),
            });
        }
        self.recompute();
    }

    /// Drop the line for `product_id`. Returns whether a line was removed;
    /// removing an absent line is not an error.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    /// Set the exact quantity of an existing line. Zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotInCart`] if there is no line for `product_id`.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<(), LedgerError> {
        let index = self
            .items
            .iter()
            .position(|item| &item.product_id == product_id)
            .ok_or_else(|| LedgerError::NotInCart(product_id.clone()))?;

        if quantity <= 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.item_count = self.items.iter().map(|item| u64::from(item.quantity)).sum();
        self.total = self.items.iter().map(CartItem::line_total).sum();
    }
}

/// Carts are equal when their lines are; the revision is not compared.
impl PartialEq for Cart {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Cart {}
