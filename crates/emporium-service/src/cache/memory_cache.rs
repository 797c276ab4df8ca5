//! In-process cache backend over a `DashMap`.

use super::backend::{glob_match, CacheBackend, CacheFault, CacheKind, CacheResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent in-process cache with per-key expiry.
///
/// Expired entries are removed lazily when read and, optionally, by a
/// background sweeper. Time comes from the tokio clock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries)
    }

    /// Starts a task that purges expired entries every `interval`.
    ///
    /// The task stops once every handle to this cache has been dropped.
    #[must_use]
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let entries: Weak<DashMap<String, CacheEntry>> = Arc::downgrade(&self.entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(live) = entries.upgrade() else {
                    break;
                };
                let purged = purge(&live);
                if purged > 0 {
                    debug!(purged, "Swept expired cache entries");
                }
            }
        })
    }
}

fn purge(entries: &DashMap<String, CacheEntry>) -> usize {
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before.saturating_sub(entries.len())
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    fn kind(&self) -> CacheKind {
        CacheKind::Memory
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now)))
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn scan(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now) && glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }

    async fn incr(&self, key: &str, delta: i64, ttl: Duration) -> CacheResult<i64> {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new("0".to_string(), ttl));

        let current: i64 = if entry.is_expired(now) {
            0
        } else {
            entry.value.parse().map_err(|_| {
                CacheFault::Command(format!("value at '{key}' is not an integer"))
            })?
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| CacheFault::Command(format!("increment of '{key}' overflows")))?;

        entry.value = next.to_string();
        entry.expires_at = now + ttl;
        Ok(next)
    }

    async fn len(&self) -> CacheResult<u64> {
        let now = Instant::now();
        let live = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count();
        Ok(live as u64)
    }
}
