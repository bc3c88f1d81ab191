//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers and domain records for the
//! catalog, cart, wishlist and shopper identity.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod query;
pub mod status;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceWindow};
pub use product::{Product, ProductSpecs};
pub use query::{
    HeightRange, PageRequest, ProductFilters, ProductList, ProductQuery, SortBy,
    UnknownHeightRange,
};
pub use status::{Badge, UserRole};
pub use user::User;
pub use wishlist::{Wishlist, WishlistItem};
