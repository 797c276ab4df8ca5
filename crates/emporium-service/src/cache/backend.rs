//! Cache backend contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A failed cache call.
///
/// Never escapes the cache layer: [`CacheFacade`](super::CacheFacade)
/// logs it and treats the call as a miss or a no-op.
#[derive(Debug, Clone, Error)]
pub enum CacheFault {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("cache payload could not be encoded or decoded: {0}")]
    Serialization(String),

    #[error("cache command failed: {0}")]
    Command(String),
}

/// Outcome of a single backend call.
pub type CacheResult<T> = Result<T, CacheFault>;

/// Which implementation sits behind a [`CacheBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Redis,
    Memory,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => f.write_str("redis"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Key/value store with mandatory per-key TTL.
///
/// Values are JSON strings. Patterns use `*` for any run of characters and
/// `?` for exactly one.
#[allow(clippy::len_without_is_empty)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    fn kind(&self) -> CacheKind;

    /// `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Unconditionally overwrites `key`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Returns whether a live key was removed. Deleting an absent key is fine.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Live keys matching `pattern`, sorted.
    async fn scan(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Drops every entry.
    async fn clear(&self) -> CacheResult<()>;

    /// Liveness probe. Never errors; a fault reads as `false`.
    async fn ping(&self) -> bool;

    /// Atomically adds `delta` to the integer at `key` (starting from 0) and
    /// resets its TTL.
    async fn incr(&self, key: &str, delta: i64, ttl: Duration) -> CacheResult<i64>;

    /// Number of live keys.
    async fn len(&self) -> CacheResult<u64>;
}

/// Glob match supporting `*` and `?`.
#[must_use]
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(&c) if c == '?' || c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    k = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_prefix() {
        assert!(glob_match("product:*", "product:123"));
        assert!(glob_match("product:*", "product:"));
        assert!(!glob_match("product:*", "category:1"));
        assert!(!glob_match("product:*", "xproduct:1"));
    }

    #[test]
    fn test_glob_single_char() {
        assert!(glob_match("cart:?", "cart:7"));
        assert!(!glob_match("cart:?", "cart:77"));
    }

    #[test]
    fn test_glob_inner_star() {
        assert!(glob_match("stats:*_hits", "stats:product_cache_hits"));
        assert!(!glob_match("stats:*_hits", "stats:product_cache_misses"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("all_categories", "all_categories"));
    }
}
