//! Integration tests for login, registration, logout and the token.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::ExposeSecret;
use vitrine_core::UserRole;
use vitrine_integration_tests::{file_backed_storefront, id, storefront};
use vitrine_storefront::{
    ErrorKind, FileTokenStore, LoginCredentials, MemoryTokenStore, QueryKey, QueryStatus,
    QueryValue, Registration, Storefront, StorefrontConfig, TokenStore,
};

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_caches_user_and_stores_token() {
    let tokens = Arc::new(MemoryTokenStore::new());
    let shop = Storefront::with_token_store(StorefrontConfig::without_latency(), tokens.clone());

    let session = shop
        .login(&LoginCredentials::new("shopper@example.com", "hunter2"))
        .await
        .unwrap();
    assert_eq!(session.user.email.as_str(), "shopper@example.com");
    assert_eq!(session.user.role, UserRole::Customer);

    let stored = tokens.load().unwrap().unwrap();
    assert_eq!(stored.expose_secret(), session.token.expose_secret());

    let state = shop.cache().state(&QueryKey::User).await.unwrap();
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data, Some(QueryValue::User(Some(session.user.clone()))));
    assert_eq!(shop.current_user().await.unwrap(), Some(session.user));
}

#[tokio::test]
async fn test_login_with_empty_email_is_rejected_without_writes() {
    let shop = storefront();
    let err = shop
        .login(&LoginCredentials::new("", "x"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(shop.cache().state(&QueryKey::User).await.is_none());
    assert!(!shop.is_signed_in().unwrap());
}

#[tokio::test]
async fn test_login_with_empty_password_is_rejected() {
    let shop = storefront();
    let err = shop
        .login(&LoginCredentials::new("a@b.co", ""))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_requires_every_field() {
    let shop = storefront();
    let incomplete = [
        Registration::new("", "Doe", "jane@example.com", "pw"),
        Registration::new("Jane", "", "jane@example.com", "pw"),
        Registration::new("Jane", "Doe", "", "pw"),
        Registration::new("Jane", "Doe", "jane@example.com", ""),
    ];
    for registration in &incomplete {
        let err = shop.register(registration).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert!(!shop.is_signed_in().unwrap());
}

#[tokio::test]
async fn test_register_signs_in_new_account() {
    let shop = storefront();
    let session = shop
        .register(&Registration::new("Jane", "Doe", "jane@example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(session.user.full_name(), "Jane Doe");
    assert!(shop.is_signed_in().unwrap());
    assert_eq!(shop.current_user().await.unwrap(), Some(session.user.clone()));

    // Logging in again with the same email finds the account.
    shop.logout().await.unwrap();
    let again = shop
        .login(&LoginCredentials::new("jane@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(again.user.id, session.user.id);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_token_and_every_cached_view() {
    let shop = storefront();
    shop.login(&LoginCredentials::new("a@b.co", "pw"))
        .await
        .unwrap();
    shop.add_to_cart(&id("1")).await.unwrap();
    shop.add_to_wishlist(&id("2")).await.unwrap();

    shop.logout().await.unwrap();

    assert!(!shop.is_signed_in().unwrap());
    for key in [QueryKey::User, QueryKey::Cart, QueryKey::Wishlist] {
        assert!(shop.cache().state(&key).await.is_none(), "{key:?} survived logout");
    }
    assert_eq!(shop.current_user().await.unwrap(), None);
}

#[tokio::test]
async fn test_logout_when_signed_out_succeeds() {
    let shop = storefront();
    shop.logout().await.unwrap();
    assert_eq!(shop.current_user().await.unwrap(), None);
}

// =============================================================================
// Token Persistence
// =============================================================================

#[tokio::test]
async fn test_file_token_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let shop = file_backed_storefront(dir.path());
    let session = shop
        .login(&LoginCredentials::new("a@b.co", "pw"))
        .await
        .unwrap();

    let store = FileTokenStore::new(dir.path());
    assert_eq!(
        store.load().unwrap().unwrap().expose_secret(),
        session.token.expose_secret()
    );

    // A fresh storefront over the same directory sees a signed-in shopper.
    let restarted = file_backed_storefront(dir.path());
    assert!(restarted.is_signed_in().unwrap());
    assert!(restarted.current_user().await.unwrap().is_some());

    restarted.logout().await.unwrap();
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_token_dir_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorefrontConfig {
        token_dir: Some(dir.path().to_path_buf()),
        ..StorefrontConfig::without_latency()
    };
    let shop = Storefront::new(config);
    shop.login(&LoginCredentials::new("a@b.co", "pw"))
        .await
        .unwrap();
    assert!(dir.path().join(vitrine_storefront::services::auth::TOKEN_KEY).exists());
}
