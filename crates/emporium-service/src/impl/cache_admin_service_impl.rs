//! Cache administration service implementation.

use crate::cache::{cache_keys, CacheDomain, CacheFacade, CacheStatsReport, CacheStatus};
use crate::cache_admin_service::CacheAdminService;
use crate::dto::{CacheHealth, CacheInfo, HealthState};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Cache admin service over a [`CacheFacade`].
pub struct CacheAdminServiceImpl {
    cache: CacheFacade,
}

impl CacheAdminServiceImpl {
    pub fn new(cache: CacheFacade) -> Self {
        Self { cache }
    }

    async fn count_keys(&self, pattern: &str) -> u64 {
        self.keys(Some(pattern)).await.len() as u64
    }
}

#[async_trait]
impl CacheAdminService for CacheAdminServiceImpl {
    async fn stats(&self) -> CacheStatsReport {
        self.cache.stats().await
    }

    async fn health(&self) -> CacheHealth {
        let Some(backend) = self.cache.backend() else {
            return CacheHealth {
                status: HealthState::Disabled,
                connected: false,
                backend: "none".to_string(),
            };
        };

        let connected = backend.ping().await;
        CacheHealth {
            status: if connected {
                HealthState::Healthy
            } else {
                HealthState::Unhealthy
            },
            connected,
            backend: backend.kind().to_string(),
        }
    }

    async fn flush_all(&self) -> bool {
        let Some(backend) = self.cache.backend() else {
            return false;
        };
        match backend.clear().await {
            Ok(()) => {
                info!("Flushed all cache entries");
                true
            }
            Err(e) => {
                warn!(error = %e, "Cache flush failed");
                false
            }
        }
    }

    async fn delete_key(&self, key: &str) -> bool {
        let Some(backend) = self.cache.backend() else {
            return false;
        };
        let deleted = backend.delete(key).await.unwrap_or(false);
        if deleted {
            info!("Deleted cache key '{}'", key);
        }
        deleted
    }

    async fn delete_pattern(&self, pattern: &str) -> u64 {
        let Some(backend) = self.cache.backend() else {
            return 0;
        };
        let keys = self.keys(Some(pattern)).await;
        let outcomes = join_all(keys.iter().map(|key| backend.delete(key))).await;
        let deleted = outcomes
            .into_iter()
            .filter(|outcome| matches!(outcome, Ok(true)))
            .count() as u64;
        info!("Deleted {} cache keys matching '{}'", deleted, pattern);
        deleted
    }

    async fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let Some(backend) = self.cache.backend() else {
            return Vec::new();
        };
        backend.scan(pattern.unwrap_or("*")).await.unwrap_or_default()
    }

    async fn info(&self) -> CacheInfo {
        let stats = self.stats().await;
        let mut key_counts = BTreeMap::new();

        if stats.status == CacheStatus::Connected {
            for domain in CacheDomain::ALL {
                let count = self
                    .count_keys(&cache_keys::partition(domain.prefix()))
                    .await;
                key_counts.insert(domain.as_str().to_string(), count);
            }
            let all_categories = self.count_keys(cache_keys::ALL_CATEGORIES).await;
            key_counts.insert(cache_keys::ALL_CATEGORIES.to_string(), all_categories);
            let counters = self
                .count_keys(&cache_keys::partition(cache_keys::STATS_PREFIX))
                .await;
            key_counts.insert("stats".to_string(), counters);
        }

        CacheInfo { stats, key_counts }
    }

    async fn reset_stats(&self) {
        self.cache.counters().reset();
        info!("Cache statistics reset");
    }
}
