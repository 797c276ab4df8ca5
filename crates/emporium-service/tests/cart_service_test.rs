//! Cart mutations, invalidation and per-user serialization.

mod common;

use common::{dollars, FailingCache, TestApp};
use emporium_core::{EmporiumError, ProductId, UserId};
use emporium_service::{cache_keys, CacheBackend, CacheFacade, CartService, InMemoryCache};
use std::sync::Arc;

#[tokio::test]
async fn test_get_cart_creates_empty_cart() {
    let app = TestApp::new();
    let user = app.seed_user("alice").await;

    let cart = app.carts.get_cart(user.id).await.unwrap();

    assert_eq!(cart.owner_id, user.id);
    assert!(cart.items.is_empty());
    assert_eq!(app.carts.get_cart(user.id).await.unwrap().id, cart.id);
}

#[tokio::test]
async fn test_get_cart_for_unknown_user_is_not_found() {
    let app = TestApp::new();
    let err = app.carts.get_cart(UserId::new()).await.unwrap_err();
    assert!(matches!(err, EmporiumError::NotFound { resource_type: "User", .. }));
}

#[tokio::test]
async fn test_adding_same_product_twice_merges_lines() {
    let app = TestApp::new();
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let book = app.seed_product(&category, "Novel", dollars(15)).await;

    app.carts.add_item(user.id, book.id, 2).await.unwrap();
    let cart = app.carts.add_item(user.id, book.id, 3).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.quantity_of(book.id), Some(5));
    assert_eq!(cart.total_quantity, 5);
}

#[tokio::test]
async fn test_add_beyond_max_quantity_is_rejected() {
    let app = TestApp::with_cache(CacheFacade::new(Arc::new(InMemoryCache::new())));
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let book = app.seed_product(&category, "Novel", dollars(15)).await;

    app.carts.add_item(user.id, book.id, i32::MAX).await.unwrap();
    let err = app.carts.add_item(user.id, book.id, 1).await.unwrap_err();
    assert!(matches!(err, EmporiumError::Validation(_)));

    let cart = app.carts.get_cart(user.id).await.unwrap();
    assert_eq!(cart.quantity_of(book.id), Some(i32::MAX));

    // The store lock was released, so further mutations still go through.
    let cart = app.carts.update_item(user.id, book.id, 4).await.unwrap();
    assert_eq!(cart.quantity_of(book.id), Some(4));
}

#[tokio::test]
async fn test_add_rejects_bad_quantity_and_unknown_product() {
    let app = TestApp::new();
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let book = app.seed_product(&category, "Novel", dollars(15)).await;

    assert!(matches!(
        app.carts.add_item(user.id, book.id, 0).await,
        Err(EmporiumError::Validation(_))
    ));
    assert!(matches!(
        app.carts.add_item(user.id, ProductId::new(), 1).await,
        Err(EmporiumError::NotFound { resource_type: "Product", .. })
    ));
    assert!(app.carts.get_cart(user.id).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_update_missing_item_is_not_found_and_leaves_cart() {
    let app = TestApp::new();
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let novel = app.seed_product(&category, "Novel", dollars(15)).await;
    let atlas = app.seed_product(&category, "Atlas", dollars(40)).await;
    app.carts.add_item(user.id, novel.id, 1).await.unwrap();

    let err = app.carts.update_item(user.id, atlas.id, 4).await.unwrap_err();

    assert!(matches!(err, EmporiumError::NotFound { .. }));
    let cart = app.carts.get_cart(user.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.quantity_of(novel.id), Some(1));
    assert_eq!(cart.quantity_of(atlas.id), None);
}

#[tokio::test]
async fn test_update_sets_absolute_quantity() {
    let app = TestApp::new();
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let novel = app.seed_product(&category, "Novel", dollars(15)).await;
    app.carts.add_item(user.id, novel.id, 3).await.unwrap();

    let cart = app.carts.update_item(user.id, novel.id, 1).await.unwrap();
    assert_eq!(cart.quantity_of(novel.id), Some(1));

    assert!(matches!(
        app.carts.update_item(user.id, novel.id, -2).await,
        Err(EmporiumError::Validation(_))
    ));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let app = TestApp::new();
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let novel = app.seed_product(&category, "Novel", dollars(15)).await;
    let atlas = app.seed_product(&category, "Atlas", dollars(40)).await;
    app.carts.add_item(user.id, novel.id, 1).await.unwrap();
    app.carts.add_item(user.id, atlas.id, 1).await.unwrap();

    let cart = app.carts.remove_item(user.id, novel.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert!(matches!(
        app.carts.remove_item(user.id, novel.id).await,
        Err(EmporiumError::NotFound { .. })
    ));

    let cleared = app.carts.clear_cart(user.id).await.unwrap();
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.id, cart.id);
}

#[tokio::test]
async fn test_mutation_invalidates_cached_cart() {
    let backend = Arc::new(InMemoryCache::new());
    let app = TestApp::with_cache(CacheFacade::new(backend.clone()));
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let novel = app.seed_product(&category, "Novel", dollars(15)).await;

    app.carts.get_cart(user.id).await.unwrap();
    assert!(backend.exists(&cache_keys::cart(user.id)).await.unwrap());

    app.carts.add_item(user.id, novel.id, 2).await.unwrap();
    assert!(!backend.exists(&cache_keys::cart(user.id)).await.unwrap());

    let cart = app.carts.get_cart(user.id).await.unwrap();
    assert_eq!(cart.quantity_of(novel.id), Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_accumulate() {
    let app = Arc::new(TestApp::new());
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let novel = app.seed_product(&category, "Novel", dollars(15)).await;

    let (user_id, product_id) = (user.id, novel.id);

    let tasks: Vec<_> = (0..25)
        .map(|_| {
            let app = Arc::clone(&app);
            tokio::spawn(async move { app.carts.add_item(user_id, product_id, 1).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let cart = app.carts.get_cart(user.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.quantity_of(novel.id), Some(25));
}

#[tokio::test]
async fn test_cart_works_with_dead_cache() {
    let app = TestApp::with_cache(CacheFacade::new(Arc::new(FailingCache)));
    let user = app.seed_user("alice").await;
    let category = app.seed_category("Books").await;
    let novel = app.seed_product(&category, "Novel", dollars(15)).await;

    app.carts.add_item(user.id, novel.id, 2).await.unwrap();

    let cart = app.carts.get_cart(user.id).await.unwrap();
    assert_eq!(cart.quantity_of(novel.id), Some(2));
}
