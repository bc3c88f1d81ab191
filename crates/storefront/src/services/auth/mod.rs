//! Authentication service.
//!
//! Validates credentials, issues opaque session tokens and tracks who is
//! signed in. There is no password check: any well-formed credentials
//! succeed. Well-formed means every required field has non-blank text and
//! the email parses as an [`Email`], since the shopper record carries one. The token lives in a [`TokenStore`] and its presence is the
//! only sign-in state.

mod error;
mod token;

pub use error::{AuthError, TokenStoreError};
pub use token::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use uuid::Uuid;

use vitrine_core::{Email, User, UserId, UserRole};

/// Id of the shopper returned for unknown logins.
const DEMO_USER_ID: &str = "1";

/// Email used when a token exists but the signed-in shopper is unknown.
const DEMO_EMAIL: &str = "john@example.com";

/// Email and password submitted to sign in.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: SecretString,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Details submitted to create an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
}

impl Registration {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// A successful sign-in: the shopper and their session token.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub token: SecretString,
}

/// Authentication service.
///
/// Cheap to share behind an `Arc`; all state is internally synchronized
/// and never held across an await point.
#[derive(Debug)]
pub struct AuthService {
    tokens: Arc<dyn TokenStore>,
    /// Accounts created through [`AuthService::register`], by email.
    accounts: RwLock<HashMap<Email, User>>,
    /// Shopper of the session whose token was persisted last.
    signed_in: RwLock<Option<User>>,
}

impl AuthService {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            tokens,
            accounts: RwLock::new(HashMap::new()),
            signed_in: RwLock::new(None),
        }
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    /// Validate login credentials and open a session.
    ///
    /// Known emails resolve to their registered account. Anything else
    /// resolves to the demo shopper carrying the submitted email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if the email or password is empty.
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    #[instrument(skip(self, credentials))]
    pub fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, AuthError> {
        require("email", &credentials.email)?;
        require("password", credentials.password.expose_secret())?;
        let email = Email::parse(&credentials.email)?;

        let registered = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&email)
            .cloned();
        let user = registered.unwrap_or_else(|| demo_user(email));

        debug!(user_id = %user.id, "Credentials accepted");
        Ok(AuthSession {
            user,
            token: issue_token(),
        })
    }

    /// Validate registration details, create the account and open a session.
    ///
    /// Registering an email twice replaces the earlier account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if any field is empty.
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    #[instrument(skip(self, registration))]
    pub fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError> {
        require("email", &registration.email)?;
        require("password", registration.password.expose_secret())?;
        require("first name", &registration.first_name)?;
        require("last name", &registration.last_name)?;
        let email = Email::parse(&registration.email)?;

        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            email: email.clone(),
            role: UserRole::Customer,
        };
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email, user.clone());

        debug!(user_id = %user.id, "Account registered");
        Ok(AuthSession {
            user,
            token: issue_token(),
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Persist the session token and remember its shopper.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token cannot be written.
    pub fn persist(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.tokens.save(&session.token)?;
        *self.signed_in.write().unwrap_or_else(PoisonError::into_inner) = Some(session.user.clone());
        Ok(())
    }

    /// Remove the session token. Succeeds when already signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token cannot be removed.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.tokens.clear()?;
        *self.signed_in.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// Whether a session token is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token store cannot be read.
    pub fn has_token(&self) -> Result<bool, AuthError> {
        Ok(self.tokens.load()?.is_some())
    }

    /// The signed-in shopper, or `None` without a stored token.
    ///
    /// A token restored from durable storage with no remembered shopper
    /// resolves to the demo shopper.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the token store cannot be read.
    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        if !self.has_token()? {
            return Ok(None);
        }
        let remembered = self
            .signed_in
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match remembered {
            Some(user) => Ok(Some(user)),
            None => Ok(Some(demo_user(Email::parse(DEMO_EMAIL)?))),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn require(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(())
}

fn demo_user(email: Email) -> User {
    User {
        id: UserId::new(DEMO_USER_ID),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email,
        role: UserRole::Customer,
    }
}

fn issue_token() -> SecretString {
    SecretString::from(format!("vitrine-{}", Uuid::new_v4()))
}
