//! Process-wide cache counters.

use super::cache_keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A cache partition with its own counters and TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDomain {
    Product,
    Category,
    Search,
    Session,
    Cart,
}

impl CacheDomain {
    pub const ALL: [Self; 5] = [
        Self::Product,
        Self::Category,
        Self::Search,
        Self::Session,
        Self::Cart,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
            Self::Search => "search",
            Self::Session => "session",
            Self::Cart => "cart",
        }
    }

    /// Key prefix of the partition.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Product => cache_keys::PRODUCT_PREFIX,
            Self::Category => cache_keys::CATEGORY_PREFIX,
            Self::Search => cache_keys::SEARCH_PREFIX,
            Self::Session => cache_keys::SESSION_PREFIX,
            Self::Cart => cache_keys::CART_PREFIX,
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counted cache event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Hit,
    Miss,
    Invalidation,
}

impl CacheEvent {
    /// Counter name mirrored into the backend, e.g. `product_cache_hits`.
    #[must_use]
    pub fn counter_name(self, domain: CacheDomain) -> String {
        let suffix = match self {
            Self::Hit => "hits",
            Self::Miss => "misses",
            Self::Invalidation => "invalidations",
        };
        format!("{}_cache_{suffix}", domain.as_str())
    }
}

#[derive(Debug, Default)]
struct DomainCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl DomainCounters {
    fn snapshot(&self) -> DomainStats {
        DomainStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
    }
}

/// Monotonic hit/miss/invalidation counters per [`CacheDomain`].
#[derive(Debug, Default)]
pub struct CacheStats {
    product: DomainCounters,
    category: DomainCounters,
    search: DomainCounters,
    session: DomainCounters,
    cart: DomainCounters,
}

impl CacheStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn counters(&self, domain: CacheDomain) -> &DomainCounters {
        match domain {
            CacheDomain::Product => &self.product,
            CacheDomain::Category => &self.category,
            CacheDomain::Search => &self.search,
            CacheDomain::Session => &self.session,
            CacheDomain::Cart => &self.cart,
        }
    }

    pub fn record(&self, domain: CacheDomain, event: CacheEvent) {
        let counters = self.counters(domain);
        let counter = match event {
            CacheEvent::Hit => &counters.hits,
            CacheEvent::Miss => &counters.misses,
            CacheEvent::Invalidation => &counters.invalidations,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self, domain: CacheDomain) -> DomainStats {
        self.counters(domain).snapshot()
    }

    /// Sum over all domains.
    #[must_use]
    pub fn totals(&self) -> DomainStats {
        CacheDomain::ALL
            .iter()
            .map(|domain| self.snapshot(*domain))
            .fold(DomainStats::default(), |acc, s| DomainStats {
                hits: acc.hits + s.hits,
                misses: acc.misses + s.misses,
                invalidations: acc.invalidations + s.invalidations,
            })
    }

    /// Per-domain snapshots keyed by domain name.
    #[must_use]
    pub fn by_domain(&self) -> BTreeMap<String, DomainStats> {
        CacheDomain::ALL
            .iter()
            .map(|domain| (domain.as_str().to_string(), self.snapshot(*domain)))
            .collect()
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        for domain in CacheDomain::ALL {
            self.counters(domain).reset();
        }
    }
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

impl DomainStats {
    /// Hits over lookups, 0.0 when nothing was looked up.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Reachability of the configured backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Connected,
    Disconnected,
    Disabled,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

/// Snapshot returned by [`CacheFacade::stats`](super::CacheFacade::stats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatsReport {
    /// `redis`, `memory` or `none`.
    pub backend: String,
    pub status: CacheStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_keys: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub domains: BTreeMap<String, DomainStats>,
    pub totals: DomainStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let stats = CacheStats::new();
        stats.record(CacheDomain::Product, CacheEvent::Hit);
        stats.record(CacheDomain::Product, CacheEvent::Miss);
        stats.record(CacheDomain::Cart, CacheEvent::Invalidation);

        let product = stats.snapshot(CacheDomain::Product);
        assert_eq!((product.hits, product.misses), (1, 1));
        assert!((product.hit_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.totals().invalidations, 1);
        assert_eq!(stats.by_domain().len(), 5);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record(CacheDomain::Search, CacheEvent::Hit);
        stats.reset();
        assert_eq!(stats.totals(), DomainStats::default());
    }

    #[test]
    fn test_counter_names() {
        assert_eq!(
            CacheEvent::Hit.counter_name(CacheDomain::Product),
            "product_cache_hits"
        );
        assert_eq!(
            CacheEvent::Invalidation.counter_name(CacheDomain::Session),
            "session_cache_invalidations"
        );
    }
}
