//! Unified error handling.
//!
//! Every [`Storefront`](crate::Storefront) operation returns
//! `Result<T, AppError>`. Layer errors convert into `AppError` via `From`,
//! so services can use `?` freely. `AppError` is `Clone` because one failed
//! fetch is handed to every reader that waited on it.

use thiserror::Error;
use vitrine_core::LedgerError;

use crate::queue::QueueError;
use crate::services::auth::{AuthError, TokenStoreError};

/// Application-level error type for the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Required input missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced product or cart line does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Durable token storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A ledger worker is gone.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Internal invariant broken.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    Unavailable,
    Internal,
}

impl AppError {
    /// Classify the error without matching on its message.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller supplied bad input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether a referenced product or line is missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingField(_) | AuthError::InvalidEmail(_) => {
                Self::Validation(err.to_string())
            }
            AuthError::Storage(inner) => inner.into(),
        }
    }
}

impl From<TokenStoreError> for AppError {
    fn from(err: TokenStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
