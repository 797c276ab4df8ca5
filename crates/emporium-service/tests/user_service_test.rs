//! Registration, lookup and session caching.

mod common;

use common::TestApp;
use emporium_core::{EmporiumError, UserId, UserRole};
use emporium_service::{
    cache_keys, CacheBackend, CacheFacade, InMemoryCache, RegisterUserRequest, UpdateUserRequest,
    UserService,
};
use std::sync::Arc;

fn register(username: &str, email: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        username: username.to_string(),
        email: email.to_string(),
        role: UserRole::Seller,
    }
}

#[tokio::test]
async fn test_register_and_lookup() {
    let app = TestApp::new();
    let created = app
        .users
        .register(register("merchant", "Shop@Example.com"))
        .await
        .unwrap();

    assert_eq!(created.email, "shop@example.com");
    assert_eq!(created.role, UserRole::Seller);
    assert_eq!(app.users.get_user(created.id).await.unwrap(), created);
    assert_eq!(app.users.get_by_username("merchant").await.unwrap(), created);
}

#[tokio::test]
async fn test_register_conflicts() {
    let app = TestApp::new();
    app.users
        .register(register("merchant", "shop@example.com"))
        .await
        .unwrap();

    let same_name = app
        .users
        .register(register("merchant", "other@example.com"))
        .await;
    assert!(matches!(same_name, Err(EmporiumError::Conflict(_))));

    let same_email = app
        .users
        .register(register("trader", "SHOP@example.com"))
        .await;
    assert!(matches!(same_email, Err(EmporiumError::Conflict(_))));
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();
    let err = app
        .users
        .register(register("x", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, EmporiumError::Validation(_)));
}

#[tokio::test]
async fn test_username_lookup_is_cached_and_invalidated() {
    let backend = Arc::new(InMemoryCache::new());
    let app = TestApp::with_cache(CacheFacade::new(backend.clone()));
    let user = app.seed_user("reader").await;

    app.users.get_by_username("reader").await.unwrap();
    assert!(backend.exists(&cache_keys::session("reader")).await.unwrap());

    let updated = app
        .users
        .update_user(
            user.id,
            UpdateUserRequest {
                email: Some("new@example.com".to_string()),
                role: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "new@example.com");
    assert!(!backend.exists(&cache_keys::session("reader")).await.unwrap());

    assert_eq!(
        app.users.get_by_username("reader").await.unwrap().email,
        "new@example.com"
    );
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new();
    let user = app.seed_user("leaver").await;
    app.users.get_by_username("leaver").await.unwrap();

    app.users.delete_user(user.id).await.unwrap();

    assert!(app.users.get_by_username("leaver").await.is_err());
    assert!(matches!(
        app.users.delete_user(user.id).await,
        Err(EmporiumError::NotFound { .. })
    ));
    assert!(app.users.get_user(UserId::new()).await.is_err());
}
