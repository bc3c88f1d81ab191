//! Authentication error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] vitrine_core::EmailError),

    /// Persisting or removing the token failed.
    #[error("token storage error: {0}")]
    Storage(#[from] TokenStoreError),
}

/// Errors from a [`TokenStore`](super::TokenStore).
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Reading or writing the token file failed.
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
