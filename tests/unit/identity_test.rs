//! Unit tests for the in-memory identity provider and session notifications.

use redblue::services::identity::{IdentityProvider, InMemoryIdentity};
use redblue::types::errors::AuthError;

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let identity = InMemoryIdentity::new();
    identity.sign_up("alice@example.com", "hunter22").await.unwrap();
    assert!(identity.current_session().is_none(), "sign-up does not sign in");

    let session = identity.sign_in("alice@example.com", "hunter22").await.unwrap();
    assert_eq!(session.user.email.as_deref(), Some("alice@example.com"));
    assert_eq!(identity.current_session(), Some(session));
}

#[tokio::test]
async fn test_sign_in_wrong_password_is_rejected() {
    let identity = InMemoryIdentity::new();
    identity.sign_up("alice@example.com", "hunter22").await.unwrap();

    let err = identity.sign_in("alice@example.com", "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::Rejected("Invalid login credentials".to_string()));
    assert!(identity.current_session().is_none());
}

#[tokio::test]
async fn test_sign_in_unknown_user_is_rejected() {
    let identity = InMemoryIdentity::new();
    let err = identity.sign_in("nobody@example.com", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[tokio::test]
async fn test_duplicate_sign_up_is_rejected() {
    let identity = InMemoryIdentity::new();
    identity.sign_up("alice@example.com", "a").await.unwrap();
    let err = identity.sign_up("alice@example.com", "b").await.unwrap_err();
    assert_eq!(err.to_string(), "User already registered");
}

#[tokio::test]
async fn test_empty_credentials_are_rejected() {
    let identity = InMemoryIdentity::new();
    assert_eq!(identity.sign_up("", "pw").await.unwrap_err(), AuthError::MissingCredentials);
    assert_eq!(identity.sign_in("a@b.c", "").await.unwrap_err(), AuthError::MissingCredentials);
}

#[tokio::test]
async fn test_sign_in_keeps_user_id_stable() {
    let identity = InMemoryIdentity::new();
    identity.sign_up("alice@example.com", "pw").await.unwrap();
    let first = identity.sign_in("alice@example.com", "pw").await.unwrap();
    identity.sign_out().await;
    let second = identity.sign_in("alice@example.com", "pw").await.unwrap();

    assert_eq!(first.user.id, second.user.id);
    assert_ne!(first.access_token, second.access_token);
}

#[tokio::test]
async fn test_subscribers_see_session_changes() {
    let identity = InMemoryIdentity::new();
    let mut rx = identity.subscribe();
    assert!(rx.borrow().is_none());

    identity.sign_up("alice@example.com", "pw").await.unwrap();
    identity.sign_in("alice@example.com", "pw").await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_some());

    identity.sign_out().await;
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_none());
}
