//! Cache administration service trait definition.

use crate::cache::CacheStatsReport;
use crate::dto::{CacheHealth, CacheInfo};
use async_trait::async_trait;

/// Operator surface over the cache.
///
/// None of these fail: an unreachable backend yields a degraded answer.
#[async_trait]
pub trait CacheAdminService: Send + Sync {
    async fn stats(&self) -> CacheStatsReport;

    async fn health(&self) -> CacheHealth;

    /// Drops every key. False if the backend is disabled or unreachable.
    async fn flush_all(&self) -> bool;

    /// Deletes one key. True if it existed.
    async fn delete_key(&self, key: &str) -> bool;

    /// Deletes every key matching a glob. Returns how many went away.
    async fn delete_pattern(&self, pattern: &str) -> u64;

    /// Keys matching a glob, sorted. `None` lists every key.
    async fn keys(&self, pattern: Option<&str>) -> Vec<String>;

    async fn info(&self) -> CacheInfo;

    /// Zeroes the local hit/miss/invalidation counters.
    async fn reset_stats(&self);
}
