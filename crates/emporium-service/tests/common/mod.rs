//! Shared fixtures: an in-memory store wired to every service.

#![allow(dead_code)]

use async_trait::async_trait;
use emporium_core::{
    Category, Email, EmporiumError, EmporiumResult, Order, OrderId, OrderStatus, Product, User,
    UserId, UserRole,
};
use emporium_repository::{
    CategoryRepository, InMemoryStore, OrderRepository, ProductRepository, UserRepository,
};
use emporium_service::{
    CacheAdminServiceImpl, CacheBackend, CacheFacade, CacheFault, CacheKind, CacheResult,
    CartLocks, CartServiceImpl, CatalogServiceImpl, CheckoutRepositories, CheckoutServiceImpl,
    InMemoryCache, UserServiceImpl,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub cache: CacheFacade,
    pub catalog: CatalogServiceImpl,
    pub users: UserServiceImpl,
    pub carts: CartServiceImpl,
    pub checkout: CheckoutServiceImpl,
    pub admin: CacheAdminServiceImpl,
}

impl TestApp {
    /// Services over an in-memory store and an in-memory cache.
    pub fn new() -> Self {
        Self::with_cache(CacheFacade::new(Arc::new(InMemoryCache::new())))
    }

    pub fn with_cache(cache: CacheFacade) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let orders: Arc<dyn OrderRepository> = store.clone();
        Self::build(store, orders, cache)
    }

    /// Like [`TestApp::new`] but order persistence always fails.
    pub fn with_failing_orders() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let cache = CacheFacade::new(Arc::new(InMemoryCache::new()));
        Self::build(store, Arc::new(FailingOrderRepository), cache)
    }

    fn build(
        store: Arc<InMemoryStore>,
        orders: Arc<dyn OrderRepository>,
        cache: CacheFacade,
    ) -> Self {
        let locks = CartLocks::new();
        let catalog = CatalogServiceImpl::new(store.clone(), store.clone(), cache.clone());
        let users = UserServiceImpl::new(store.clone(), cache.clone());
        let carts = CartServiceImpl::new(store.clone(), store.clone(), cache.clone(), locks.clone());
        let checkout = CheckoutServiceImpl::new(
            CheckoutRepositories {
                users: store.clone(),
                products: store.clone(),
                carts: store.clone(),
                orders,
            },
            cache.clone(),
            locks,
        );
        let admin = CacheAdminServiceImpl::new(cache.clone());

        Self {
            store,
            cache,
            catalog,
            users,
            carts,
            checkout,
            admin,
        }
    }

    pub async fn seed_user(&self, username: &str) -> User {
        let email = Email::new(format!("{username}@example.com")).unwrap();
        UserRepository::save(self.store.as_ref(), &User::new(username, email, UserRole::Customer))
            .await
            .unwrap()
    }

    pub async fn seed_category(&self, name: &str) -> Category {
        CategoryRepository::save(self.store.as_ref(), &Category::new(name, None))
            .await
            .unwrap()
    }

    pub async fn seed_product(&self, category: &Category, name: &str, price: Decimal) -> Product {
        let product = Product::new(name, format!("{name} description"), price, 10, category.id);
        ProductRepository::save(self.store.as_ref(), &product)
            .await
            .unwrap()
    }
}

/// `$n.00`
pub fn dollars(n: i64) -> Decimal {
    Decimal::new(n * 100, 2)
}

/// A cache backend whose every call fails.
pub struct FailingCache;

#[async_trait]
impl CacheBackend for FailingCache {
    fn kind(&self) -> CacheKind {
        CacheKind::Redis
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }

    async fn scan(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }

    async fn clear(&self) -> CacheResult<()> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> bool {
        false
    }

    async fn incr(&self, _key: &str, _delta: i64, _ttl: Duration) -> CacheResult<i64> {
        Err(CacheFault::Timeout(Duration::from_millis(250)))
    }

    async fn len(&self) -> CacheResult<u64> {
        Err(CacheFault::Unavailable("connection refused".to_string()))
    }
}

/// An order repository that cannot persist anything.
pub struct FailingOrderRepository;

#[async_trait]
impl OrderRepository for FailingOrderRepository {
    async fn create(&self, _order: &Order) -> EmporiumResult<Order> {
        Err(EmporiumError::Database("connection reset by peer".to_string()))
    }

    async fn find_by_id(&self, _id: OrderId) -> EmporiumResult<Option<Order>> {
        Ok(None)
    }

    async fn find_by_owner(&self, _owner_id: UserId) -> EmporiumResult<Vec<Order>> {
        Ok(Vec::new())
    }

    async fn update_status(&self, _id: OrderId, _status: OrderStatus) -> EmporiumResult<bool> {
        Ok(false)
    }
}

/// Counts how many times a loader ran.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
