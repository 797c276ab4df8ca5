//! Domain-level cache-aside operations.

use super::backend::{CacheBackend, CacheResult};
use super::cache_keys;
use super::stats::{CacheDomain, CacheEvent, CacheStats, CacheStatsReport, CacheStatus};
use emporium_core::{
    Cart, Category, CategoryId, EmporiumResult, Product, ProductId, User, UserId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-aside front for products, categories, search results, sessions and
/// carts.
///
/// Owns key naming and TTLs. Backend faults are logged and read as misses;
/// nothing here fails a request. Writes to the store must be followed by the
/// matching `invalidate_*` call; the facade never refreshes an entry in place.
#[derive(Clone)]
pub struct CacheFacade {
    backend: Option<Arc<dyn CacheBackend>>,
    stats: Arc<CacheStats>,
}

impl CacheFacade {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// A facade without a backend: reads always miss, writes do nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            backend: None,
            stats: Arc::new(CacheStats::new()),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub fn backend(&self) -> Option<&Arc<dyn CacheBackend>> {
        self.backend.as_ref()
    }

    #[must_use]
    pub fn counters(&self) -> &CacheStats {
        &self.stats
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn cache_product(&self, product: &Product) {
        self.store(&cache_keys::product(product.id), product, cache_keys::PRODUCT_TTL)
            .await;
    }

    pub async fn get_cached_product(&self, id: ProductId) -> Option<Product> {
        self.lookup(CacheDomain::Product, &cache_keys::product(id))
            .await
    }

    pub async fn invalidate_product(&self, id: ProductId) {
        self.invalidate(CacheDomain::Product, &cache_keys::product(id))
            .await;
    }

    /// Reads `product:{id}`, falling back to `loader` on a miss.
    pub async fn product<F, Fut>(&self, id: ProductId, loader: F) -> EmporiumResult<Product>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<Product>>,
    {
        self.read_through(
            CacheDomain::Product,
            &cache_keys::product(id),
            cache_keys::PRODUCT_TTL,
            loader,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn cache_category(&self, category: &Category) {
        self.store(
            &cache_keys::category(category.id),
            category,
            cache_keys::CATEGORY_TTL,
        )
        .await;
    }

    pub async fn get_cached_category(&self, id: CategoryId) -> Option<Category> {
        self.lookup(CacheDomain::Category, &cache_keys::category(id))
            .await
    }

    pub async fn invalidate_category(&self, id: CategoryId) {
        self.invalidate(CacheDomain::Category, &cache_keys::category(id))
            .await;
    }

    pub async fn category<F, Fut>(&self, id: CategoryId, loader: F) -> EmporiumResult<Category>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<Category>>,
    {
        self.read_through(
            CacheDomain::Category,
            &cache_keys::category(id),
            cache_keys::CATEGORY_TTL,
            loader,
        )
        .await
    }

    pub async fn cache_all_categories(&self, categories: &[Category]) {
        self.store(
            cache_keys::ALL_CATEGORIES,
            &categories,
            cache_keys::ALL_CATEGORIES_TTL,
        )
        .await;
    }

    pub async fn get_cached_all_categories(&self) -> Option<Vec<Category>> {
        self.lookup(CacheDomain::Category, cache_keys::ALL_CATEGORIES)
            .await
    }

    pub async fn invalidate_all_categories(&self) {
        self.invalidate(CacheDomain::Category, cache_keys::ALL_CATEGORIES)
            .await;
    }

    pub async fn all_categories<F, Fut>(&self, loader: F) -> EmporiumResult<Vec<Category>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<Vec<Category>>>,
    {
        self.read_through(
            CacheDomain::Category,
            cache_keys::ALL_CATEGORIES,
            cache_keys::ALL_CATEGORIES_TTL,
            loader,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Search results
    // ------------------------------------------------------------------

    pub async fn cache_search_results(&self, term: &str, results: &[Product]) {
        self.store(&cache_keys::search(term), &results, cache_keys::SEARCH_TTL)
            .await;
    }

    pub async fn get_cached_search_results(&self, term: &str) -> Option<Vec<Product>> {
        self.lookup(CacheDomain::Search, &cache_keys::search(term))
            .await
    }

    pub async fn invalidate_search_results(&self, term: &str) {
        self.invalidate(CacheDomain::Search, &cache_keys::search(term))
            .await;
    }

    /// Drops every cached search result. Returns how many keys went away.
    pub async fn invalidate_all_search_results(&self) -> u64 {
        self.invalidate_partition(CacheDomain::Search, cache_keys::SEARCH_PREFIX)
            .await
    }

    pub async fn search<F, Fut>(&self, term: &str, loader: F) -> EmporiumResult<Vec<Product>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<Vec<Product>>>,
    {
        self.read_through(
            CacheDomain::Search,
            &cache_keys::search(term),
            cache_keys::SEARCH_TTL,
            loader,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub async fn cache_user_session(&self, user: &User) {
        self.store(
            &cache_keys::session(&user.username),
            user,
            cache_keys::SESSION_TTL,
        )
        .await;
    }

    pub async fn get_user_session(&self, username: &str) -> Option<User> {
        self.lookup(CacheDomain::Session, &cache_keys::session(username))
            .await
    }

    pub async fn invalidate_user_session(&self, username: &str) {
        self.invalidate(CacheDomain::Session, &cache_keys::session(username))
            .await;
    }

    pub async fn session<F, Fut>(&self, username: &str, loader: F) -> EmporiumResult<User>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<User>>,
    {
        self.read_through(
            CacheDomain::Session,
            &cache_keys::session(username),
            cache_keys::SESSION_TTL,
            loader,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Carts
    // ------------------------------------------------------------------

    pub async fn cache_cart(&self, cart: &Cart) {
        self.store(&cache_keys::cart(cart.owner_id), cart, cache_keys::CART_TTL)
            .await;
    }

    pub async fn get_cached_cart(&self, user_id: UserId) -> Option<Cart> {
        self.lookup(CacheDomain::Cart, &cache_keys::cart(user_id))
            .await
    }

    pub async fn invalidate_cart_cache(&self, user_id: UserId) {
        self.invalidate(CacheDomain::Cart, &cache_keys::cart(user_id))
            .await;
    }

    /// Drops every cached cart. Used when a write cascades into carts whose
    /// owners are not known up front.
    pub async fn invalidate_all_carts(&self) -> u64 {
        self.invalidate_partition(CacheDomain::Cart, cache_keys::CART_PREFIX)
            .await
    }

    pub async fn cart<F, Fut>(&self, user_id: UserId, loader: F) -> EmporiumResult<Cart>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<Cart>>,
    {
        self.read_through(
            CacheDomain::Cart,
            &cache_keys::cart(user_id),
            cache_keys::CART_TTL,
            loader,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    /// Counters plus backend reachability. Never fails.
    pub async fn stats(&self) -> CacheStatsReport {
        let domains = self.stats.by_domain();
        let totals = self.stats.totals();

        let Some(backend) = &self.backend else {
            return CacheStatsReport {
                backend: "none".to_string(),
                status: CacheStatus::Disabled,
                total_keys: None,
                error: None,
                domains,
                totals,
            };
        };

        let (status, total_keys, error) = if backend.ping().await {
            match backend.len().await {
                Ok(keys) => (CacheStatus::Connected, Some(keys), None),
                Err(fault) => (CacheStatus::Connected, None, Some(fault.to_string())),
            }
        } else {
            (
                CacheStatus::Disconnected,
                None,
                Some("cache backend did not answer ping".to_string()),
            )
        };

        CacheStatsReport {
            backend: backend.kind().to_string(),
            status,
            total_keys,
            error,
            domains,
            totals,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn read_through<T, F, Fut>(
        &self,
        domain: CacheDomain,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> EmporiumResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = EmporiumResult<T>>,
    {
        if let Some(hit) = self.lookup::<T>(domain, key).await {
            return Ok(hit);
        }

        let value = loader().await?;
        self.store(key, &value, ttl).await;
        Ok(value)
    }

    /// Counted read. Faults and undecodable payloads count as misses. After a
    /// fault the miss is only recorded locally.
    async fn lookup<T: DeserializeOwned>(&self, domain: CacheDomain, key: &str) -> Option<T> {
        match self.fetch::<T>(key).await {
            Ok(Some(value)) => {
                debug!("Cache hit for key '{}'", key);
                self.count(domain, CacheEvent::Hit).await;
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss for key '{}'", key);
                self.count(domain, CacheEvent::Miss).await;
                None
            }
            Err(e) => {
                debug!("Cache miss for key '{}' ({})", key, e);
                self.stats.record(domain, CacheEvent::Miss);
                None
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(None);
        };
        let Some(raw) = backend.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Dropping undecodable cache entry");
                let _ = backend.delete(key).await;
                Ok(None)
            }
        }
    }

    async fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = &self.backend else {
            return;
        };
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };
        if backend.set(key, &json, ttl).await.is_ok() {
            debug!("Cached key '{}' for {}s", key, ttl.as_secs());
        }
    }

    async fn invalidate(&self, domain: CacheDomain, key: &str) {
        let Some(backend) = &self.backend else {
            return;
        };
        if backend.delete(key).await.is_ok() {
            debug!("Invalidated cache key '{}'", key);
            self.count(domain, CacheEvent::Invalidation).await;
        } else {
            self.stats.record(domain, CacheEvent::Invalidation);
        }
    }

    async fn invalidate_partition(&self, domain: CacheDomain, prefix: &str) -> u64 {
        let Some(backend) = &self.backend else {
            return 0;
        };
        let Ok(keys) = backend.scan(&cache_keys::partition(prefix)).await else {
            return 0;
        };
        let mut removed = 0;
        for key in keys {
            if backend.delete(&key).await.unwrap_or(false) {
                removed += 1;
            }
            self.count(domain, CacheEvent::Invalidation).await;
        }
        debug!("Invalidated {} keys under '{}'", removed, prefix);
        removed
    }

    /// Bumps the local counter and, best effort, its `stats:` mirror.
    async fn count(&self, domain: CacheDomain, event: CacheEvent) {
        self.stats.record(domain, event);
        if let Some(backend) = &self.backend {
            let key = cache_keys::stats(&event.counter_name(domain));
            let _ = backend.incr(&key, 1, cache_keys::STATS_TTL).await;
        }
    }
}

impl std::fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFacade")
            .field("backend", &self.backend.as_ref().map(|b| b.kind()))
            .finish_non_exhaustive()
    }
}
