//! Storefront services.
//!
//! # Services
//!
//! - `auth` - Credential validation, session tokens and token storage
//! - `ledger` - Serialized cart and wishlist ledgers
//! - `backend` - Mock commerce backend with simulated latency

pub mod auth;
pub mod backend;
pub mod ledger;

pub use auth::{AuthService, AuthSession, LoginCredentials, Registration};
pub use backend::MockBackend;
pub use ledger::{CartLedger, WishlistLedger};
