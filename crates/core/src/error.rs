//! Errors raised by the catalog and ledgers.

use thiserror::Error;

use crate::types::ProductId;

/// A ledger mutation referenced something that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The product ID is not in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product has no line in the cart.
    #[error("product not in cart: {0}")]
    NotInCart(ProductId),
}

/// The catalog could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two products share an ID.
    #[error("duplicate product id: {0}")]
    DuplicateProductId(ProductId),
}
