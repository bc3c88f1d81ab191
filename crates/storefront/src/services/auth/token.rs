//! Durable storage for the session token.
//!
//! The token is the only signal of sign-in state: present means signed
//! in. It is stored under a fixed name, [`TOKEN_KEY`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use super::TokenStoreError;

/// Name the token is stored under.
pub const TOKEN_KEY: &str = "auth-token";

/// Client-local storage for the session token.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError>;

    /// Store `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Removing an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        Ok(token.clone().map(SecretString::from))
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(token.expose_secret().to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token storage in a single file named [`TOKEN_KEY`] inside a directory.
///
/// The token survives process restarts.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token in `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(TOKEN_KEY);
        Self { dir, path }
    }

    /// Full path of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| SecretString::from(token.to_owned())))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("reading", e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| self.io_error("creating directory for", e))?;
        std::fs::write(&self.path, token.expose_secret()).map_err(|e| self.io_error("writing", e))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("removing", e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn exposed(store: &dyn TokenStore) -> Option<String> {
        store
            .load()
            .unwrap()
            .map(|token| token.expose_secret().to_owned())
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(exposed(&store), None);

        store.save(&SecretString::from("abc".to_string())).unwrap();
        assert_eq!(exposed(&store).as_deref(), Some("abc"));

        store.clear().unwrap();
        assert_eq!(exposed(&store), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("session");

        let store = FileTokenStore::new(&nested);
        assert_eq!(exposed(&store), None);
        store.save(&SecretString::from("tok-1".to_string())).unwrap();
        assert!(store.path().ends_with(TOKEN_KEY));

        let reopened = FileTokenStore::new(&nested);
        assert_eq!(exposed(&reopened).as_deref(), Some("tok-1"));

        reopened.clear().unwrap();
        assert_eq!(exposed(&store), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_ignores_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_KEY), "  \n").unwrap();
        assert_eq!(exposed(&FileTokenStore::new(dir.path())), None);
    }
}
