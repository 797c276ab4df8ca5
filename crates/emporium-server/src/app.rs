//! Application context and component selection.

use emporium_config::{AppConfig, CacheBackendKind, CacheConfig, CacheFallback, DatabaseConfig};
use emporium_core::EmporiumResult;
use emporium_repository::{
    create_pool, CartRepository, CategoryRepository, DatabasePool, InMemoryStore,
    MySqlCartRepository, MySqlCategoryRepository, MySqlOrderRepository, MySqlProductRepository,
    MySqlUserRepository, OrderRepository, ProductRepository, UserRepository,
};
use emporium_service::{
    CacheAdminService, CacheAdminServiceImpl, CacheBackend, CacheFacade, CartLocks, CartService,
    CartServiceImpl, CatalogService, CatalogServiceImpl, CheckoutRepositories, CheckoutService,
    CheckoutServiceImpl, InMemoryCache, RemoteCache, UserService, UserServiceImpl,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One handle per repository contract.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    /// Every contract served by one in-process store.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            categories: store.clone(),
            products: store.clone(),
            carts: store.clone(),
            orders: store,
        }
    }

    #[must_use]
    pub fn mysql(pool: &Arc<DatabasePool>) -> Self {
        Self {
            users: Arc::new(MySqlUserRepository::new(Arc::clone(pool))),
            categories: Arc::new(MySqlCategoryRepository::new(Arc::clone(pool))),
            products: Arc::new(MySqlProductRepository::new(Arc::clone(pool))),
            carts: Arc::new(MySqlCartRepository::new(Arc::clone(pool))),
            orders: Arc::new(MySqlOrderRepository::new(Arc::clone(pool))),
        }
    }
}

/// Opens the store named by `database.url`.
///
/// Returns the pool as well when the store is MySQL so it can be closed on
/// shutdown.
pub async fn connect_store(
    config: &DatabaseConfig,
) -> EmporiumResult<(Repositories, Option<Arc<DatabasePool>>)> {
    if config.is_in_memory() {
        info!("Using in-memory store");
        return Ok((Repositories::in_memory(), None));
    }

    let pool = create_pool(config).await?;
    if config.run_migrations {
        pool.run_migrations().await?;
    }
    Ok((Repositories::mysql(&pool), Some(pool)))
}

/// The chosen cache plus the sweeper task of an in-memory backend.
pub struct CacheSelection {
    pub facade: CacheFacade,
    pub sweeper: Option<JoinHandle<()>>,
}

impl CacheSelection {
    fn disabled() -> Self {
        info!("Cache disabled");
        Self {
            facade: CacheFacade::disabled(),
            sweeper: None,
        }
    }

    fn memory(config: &CacheConfig) -> Self {
        let cache = InMemoryCache::new();
        let sweeper = config
            .sweep_interval()
            .map(|interval| cache.spawn_sweeper(interval));
        info!("Using in-memory cache");
        Self {
            facade: CacheFacade::new(Arc::new(cache)),
            sweeper,
        }
    }

    fn fallback(config: &CacheConfig) -> Self {
        match config.fallback {
            CacheFallback::Memory => Self::memory(config),
            CacheFallback::Disabled => Self::disabled(),
        }
    }
}

/// Picks the cache backend once, at startup.
///
/// A Redis pool that cannot be built, or that does not answer the first
/// ping, is replaced by `cache.fallback`.
pub async fn select_cache(config: &CacheConfig) -> CacheSelection {
    match config.backend {
        CacheBackendKind::Disabled => CacheSelection::disabled(),
        CacheBackendKind::Memory => CacheSelection::memory(config),
        CacheBackendKind::Redis => {
            match RemoteCache::connect(
                &config.redis_url,
                config.pool_size,
                config.operation_timeout(),
            ) {
                Ok(remote) if remote.ping().await => {
                    info!("Using Redis cache at {}", config.redis_url);
                    CacheSelection {
                        facade: CacheFacade::new(Arc::new(remote)),
                        sweeper: None,
                    }
                }
                Ok(_) => {
                    warn!(
                        "Redis at {} did not answer, falling back to {:?} cache",
                        config.redis_url, config.fallback
                    );
                    CacheSelection::fallback(config)
                }
                Err(e) => {
                    warn!(error = %e, "Could not build Redis pool, falling back to {:?} cache", config.fallback);
                    CacheSelection::fallback(config)
                }
            }
        }
    }
}

/// Fully wired application.
pub struct AppContext {
    pub config: AppConfig,
    pub cache: CacheFacade,
    pub catalog: Arc<dyn CatalogService>,
    pub users: Arc<dyn UserService>,
    pub carts: Arc<dyn CartService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub cache_admin: Arc<dyn CacheAdminService>,
    pool: Option<Arc<DatabasePool>>,
    sweeper: Option<JoinHandle<()>>,
}

impl AppContext {
    /// Connects the store, selects the cache and wires every service.
    pub async fn build(config: AppConfig) -> EmporiumResult<Self> {
        let (repos, pool) = connect_store(&config.database).await?;
        let CacheSelection { facade, sweeper } = select_cache(&config.cache).await;
        Ok(Self::assemble(config, repos, facade, pool, sweeper))
    }

    /// Wires services over already-chosen components.
    #[must_use]
    pub fn with_components(config: AppConfig, repos: Repositories, cache: CacheFacade) -> Self {
        Self::assemble(config, repos, cache, None, None)
    }

    fn assemble(
        config: AppConfig,
        repos: Repositories,
        cache: CacheFacade,
        pool: Option<Arc<DatabasePool>>,
        sweeper: Option<JoinHandle<()>>,
    ) -> Self {
        let locks = CartLocks::new();

        let catalog = Arc::new(CatalogServiceImpl::new(
            Arc::clone(&repos.products),
            Arc::clone(&repos.categories),
            cache.clone(),
        ));
        let users = Arc::new(UserServiceImpl::new(Arc::clone(&repos.users), cache.clone()));
        let carts = Arc::new(CartServiceImpl::new(
            Arc::clone(&repos.carts),
            Arc::clone(&repos.products),
            cache.clone(),
            locks.clone(),
        ));
        let checkout = Arc::new(CheckoutServiceImpl::new(
            CheckoutRepositories {
                users: repos.users,
                products: repos.products,
                carts: repos.carts,
                orders: repos.orders,
            },
            cache.clone(),
            locks,
        ));
        let cache_admin = Arc::new(CacheAdminServiceImpl::new(cache.clone()));

        Self {
            config,
            cache,
            catalog,
            users,
            carts,
            checkout,
            cache_admin,
            pool,
            sweeper,
        }
    }

    /// Name of the active store.
    #[must_use]
    pub fn store_kind(&self) -> &'static str {
        if self.pool.is_some() {
            "mysql"
        } else {
            "memory"
        }
    }

    /// Stops background work and closes the database pool.
    pub async fn shutdown(self) {
        if let Some(sweeper) = self.sweeper {
            sweeper.abort();
        }
        if let Some(pool) = self.pool {
            pool.close().await;
        }
        info!("Application shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_config::MEMORY_DATABASE_SCHEME;
    use emporium_service::CacheStatus;
    use std::time::Duration;

    fn memory_config(backend: CacheBackendKind, fallback: CacheFallback) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = MEMORY_DATABASE_SCHEME.to_string();
        config.cache.backend = backend;
        config.cache.fallback = fallback;
        config.cache.redis_url = "redis://127.0.0.1:1".to_string();
        config.cache.operation_timeout_ms = 200;
        config
    }

    #[tokio::test]
    async fn test_build_with_memory_store_and_cache() {
        let app = AppContext::build(memory_config(CacheBackendKind::Memory, CacheFallback::Memory))
            .await
            .unwrap();

        assert_eq!(app.store_kind(), "memory");
        assert_eq!(app.cache_admin.stats().await.backend, "memory");
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let config = memory_config(CacheBackendKind::Redis, CacheFallback::Memory);
        let selection = tokio::time::timeout(Duration::from_secs(5), select_cache(&config.cache))
            .await
            .unwrap();

        let report = selection.facade.stats().await;
        assert_eq!(report.backend, "memory");
        assert_eq!(report.status, CacheStatus::Connected);
    }

    #[tokio::test]
    async fn test_unreachable_redis_can_fall_back_to_disabled() {
        let config = memory_config(CacheBackendKind::Redis, CacheFallback::Disabled);
        let selection = select_cache(&config.cache).await;
        assert!(!selection.facade.is_enabled());
        assert!(selection.sweeper.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_still_serves_reads() {
        let app = AppContext::build(memory_config(CacheBackendKind::Disabled, CacheFallback::Memory))
            .await
            .unwrap();

        assert!(app.catalog.list_categories().await.unwrap().is_empty());
        assert_eq!(app.cache_admin.stats().await.status, CacheStatus::Disabled);
    }
}
