//! Caching layer.
//!
//! `CacheBackend` is the storage seam (Redis or in-process); `CacheFacade`
//! layers key naming, TTLs and hit/miss accounting on top of it.

mod backend;
pub mod cache_keys;
mod facade;
mod memory_cache;
mod redis_cache;
mod stats;

pub use backend::{glob_match, CacheBackend, CacheFault, CacheKind, CacheResult};
pub use facade::CacheFacade;
pub use memory_cache::InMemoryCache;
pub use redis_cache::RemoteCache;
pub use stats::{
    CacheDomain, CacheEvent, CacheStats, CacheStatsReport, CacheStatus, DomainStats,
};
