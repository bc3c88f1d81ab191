//! Vitrine Core - catalog, cart and wishlist types.
//!
//! This crate provides the pure half of the storefront:
//! - [`catalog`] - the read-only product catalog and its filter/sort engine
//! - [`types`] - newtypes and records for products, queries, carts,
//!   wishlists and shoppers
//! - [`error`] - ledger and catalog errors
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! async, no clocks (timestamps are passed in). The `vitrine-storefront`
//! crate wraps these in serialized ledgers and a query cache.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{Catalog, Facets};
pub use error::{CatalogError, LedgerError};
pub use types::*;
