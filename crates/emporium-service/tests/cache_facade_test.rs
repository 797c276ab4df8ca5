//! Cache-aside behaviour of the facade over a real in-memory backend.

mod common;

use async_trait::async_trait;
use common::{dollars, CallCounter, FailingCache};
use emporium_core::{Category, CategoryId, EmporiumError, Product};
use emporium_service::{
    cache_keys, CacheBackend, CacheDomain, CacheFacade, CacheFault, CacheKind, CacheResult,
    CacheStatus, InMemoryCache,
};
use std::sync::Arc;
use std::time::Duration;

/// Unreachable backend that counts the round trips it is asked for.
#[derive(Default)]
struct UnreachableCache {
    calls: CallCounter,
    incrs: CallCounter,
}

impl UnreachableCache {
    fn refuse<T>(&self) -> CacheResult<T> {
        self.calls.bump();
        Err(CacheFault::Timeout(Duration::from_millis(100)))
    }
}

#[async_trait]
impl CacheBackend for UnreachableCache {
    fn kind(&self) -> CacheKind {
        CacheKind::Redis
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.refuse()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        self.refuse()
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        self.refuse()
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        self.refuse()
    }

    async fn scan(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        self.refuse()
    }

    async fn clear(&self) -> CacheResult<()> {
        self.refuse()
    }

    async fn ping(&self) -> bool {
        false
    }

    async fn incr(&self, _key: &str, _delta: i64, _ttl: Duration) -> CacheResult<i64> {
        self.incrs.bump();
        self.refuse()
    }

    async fn len(&self) -> CacheResult<u64> {
        self.refuse()
    }
}

fn facade() -> (CacheFacade, Arc<InMemoryCache>) {
    let backend = Arc::new(InMemoryCache::new());
    (CacheFacade::new(backend.clone()), backend)
}

#[tokio::test]
async fn test_second_read_within_ttl_skips_loader() {
    let (cache, _) = facade();
    let product = Product::new("Mug", "", dollars(8), 3, CategoryId::new());
    let calls = CallCounter::default();

    for _ in 0..2 {
        let counter = calls.clone();
        let loaded = product.clone();
        let got = cache
            .product(product.id, || async move {
                counter.bump();
                Ok(loaded)
            })
            .await
            .unwrap();
        assert_eq!(got, product);
    }

    assert_eq!(calls.get(), 1);
    let stats = cache.counters().snapshot(CacheDomain::Product);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let (cache, _) = facade();
    let category = Category::new("Books", None);
    cache.cache_category(&category).await;

    tokio::time::advance(cache_keys::CATEGORY_TTL - Duration::from_secs(1)).await;
    assert_eq!(cache.get_cached_category(category.id).await, Some(category.clone()));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get_cached_category(category.id).await, None);
}

#[tokio::test]
async fn test_loader_errors_propagate_and_nothing_is_cached() {
    let (cache, backend) = facade();
    let id = CategoryId::new();

    let err = cache
        .category(id, || async move { Err(EmporiumError::not_found("Category", id)) })
        .await
        .unwrap_err();

    assert!(matches!(err, EmporiumError::NotFound { .. }));
    assert!(!backend.exists(&cache_keys::category(id)).await.unwrap());
}

#[tokio::test]
async fn test_undecodable_payload_is_a_miss_and_is_dropped() {
    let (cache, backend) = facade();
    let product = Product::new("Pen", "", dollars(1), 1, CategoryId::new());
    let key = cache_keys::product(product.id);
    backend
        .set(&key, "{not json", cache_keys::PRODUCT_TTL)
        .await
        .unwrap();

    assert_eq!(cache.get_cached_product(product.id).await, None);
    assert!(!backend.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_invalidate_removes_entry_and_counts() {
    let (cache, _) = facade();
    let product = Product::new("Lamp", "", dollars(20), 1, CategoryId::new());
    cache.cache_product(&product).await;

    cache.invalidate_product(product.id).await;

    assert_eq!(cache.get_cached_product(product.id).await, None);
    assert_eq!(cache.counters().snapshot(CacheDomain::Product).invalidations, 1);
}

#[tokio::test]
async fn test_counted_events_are_mirrored_to_backend() {
    let (cache, backend) = facade();
    let _ = cache.get_cached_cart(emporium_core::UserId::new()).await;
    let _ = cache.get_cached_cart(emporium_core::UserId::new()).await;

    let raw = backend
        .get(&cache_keys::stats("cart_cache_misses"))
        .await
        .unwrap();
    assert_eq!(raw.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_search_partition_invalidation() {
    let (cache, backend) = facade();
    let results = vec![Product::new("Desk", "", dollars(90), 1, CategoryId::new())];
    cache.cache_search_results("desk", &results).await;
    cache.cache_search_results("chair", &[]).await;

    assert_eq!(cache.invalidate_all_search_results().await, 2);
    assert!(backend.scan("search:*").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_key_uses_trimmed_term() {
    let (cache, _) = facade();
    cache.cache_search_results("  desk ", &[]).await;
    assert_eq!(cache.get_cached_search_results("desk").await, Some(Vec::new()));
}

#[tokio::test]
async fn test_disabled_facade_always_loads() {
    let cache = CacheFacade::disabled();
    let calls = CallCounter::default();

    for _ in 0..3 {
        let counter = calls.clone();
        cache
            .all_categories(|| async move {
                counter.bump();
                Ok(Vec::new())
            })
            .await
            .unwrap();
    }

    assert_eq!(calls.get(), 3);
    let report = cache.stats().await;
    assert_eq!(report.status, CacheStatus::Disabled);
    assert_eq!(report.backend, "none");
}

#[tokio::test]
async fn test_failing_backend_reads_fall_through_to_loader() {
    let cache = CacheFacade::new(Arc::new(FailingCache));
    let product = Product::new("Kettle", "", dollars(30), 2, CategoryId::new());

    let loaded = product.clone();
    let got = cache
        .product(product.id, || async move { Ok(loaded) })
        .await
        .unwrap();
    assert_eq!(got, product);

    cache.invalidate_product(product.id).await;

    let report = cache.stats().await;
    assert_eq!(report.status, CacheStatus::Disconnected);
    assert!(report.error.is_some());
    assert_eq!(report.backend, "redis");
}

#[tokio::test]
async fn test_failed_read_skips_counter_mirror() {
    let backend = Arc::new(UnreachableCache::default());
    let cache = CacheFacade::new(backend.clone());
    let product = Product::new("Kettle", "", dollars(30), 2, CategoryId::new());

    let loaded = product.clone();
    cache
        .product(product.id, || async move { Ok(loaded) })
        .await
        .unwrap();
    cache.invalidate_product(product.id).await;

    // get, set, delete: one round trip each and no stats increments.
    assert_eq!(backend.calls.get(), 3);
    assert_eq!(backend.incrs.get(), 0);
    let stats = cache.counters().snapshot(CacheDomain::Product);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.invalidations, 1);
}

#[tokio::test]
async fn test_stats_report_counts_keys_when_connected() {
    let (cache, _) = facade();
    cache.cache_all_categories(&[Category::new("Garden", None)]).await;

    let report = cache.stats().await;
    assert_eq!(report.status, CacheStatus::Connected);
    assert_eq!(report.backend, "memory");
    assert_eq!(report.total_keys, Some(1));
}
