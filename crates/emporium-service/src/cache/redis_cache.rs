//! Redis cache backend.

use super::backend::{CacheBackend, CacheFault, CacheKind, CacheResult};
use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands, RedisError};
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Keys fetched per `SCAN` round trip.
const SCAN_BATCH: usize = 500;

/// Cache backend over a pooled Redis connection.
///
/// Every call, including connection checkout, is bounded by the operation
/// timeout. Failures are logged and returned as [`CacheFault`].
#[derive(Clone)]
pub struct RemoteCache {
    pool: Pool,
    op_timeout: Duration,
}

impl RemoteCache {
    #[must_use]
    pub fn new(pool: Pool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Builds a pool for `url`. Does not connect.
    pub fn connect(url: &str, pool_size: usize, op_timeout: Duration) -> CacheResult<Self> {
        let mut config = Config::from_url(url);
        config.pool = Some(PoolConfig::new(pool_size));
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheFault::Unavailable(format!("Failed to create Redis pool: {e}")))?;
        Ok(Self::new(pool, op_timeout))
    }

    async fn execute<T, F, Fut>(
        &self,
        operation: &'static str,
        key: &str,
        command: F,
    ) -> CacheResult<T>
    where
        F: FnOnce(Connection) -> Fut,
        Fut: Future<Output = Result<T, RedisError>>,
    {
        let attempt = async {
            let conn = self.pool.get().await.map_err(|e| {
                CacheFault::Unavailable(format!("Failed to get Redis connection: {e}"))
            })?;
            command(conn)
                .await
                .map_err(|e| CacheFault::Command(e.to_string()))
        };

        let fault = match tokio::time::timeout(self.op_timeout, attempt).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(fault)) => fault,
            Err(_) => CacheFault::Timeout(self.op_timeout),
        };
        warn!(operation, key, error = %fault, "Redis cache operation failed");
        Err(fault)
    }
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheBackend for RemoteCache {
    fn kind(&self) -> CacheKind {
        CacheKind::Redis
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.execute("get", key, |mut conn| async move {
            let value: Option<String> = conn.get(key).await?;
            Ok::<_, RedisError>(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let secs = ttl_secs(ttl);
        self.execute("set", key, |mut conn| async move {
            conn.set_ex::<_, _, ()>(key, value, secs).await
        })
        .await?;
        debug!("Cached key '{}' with TTL {}s", key, secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.execute("delete", key, |mut conn| async move {
            let removed: i64 = conn.del(key).await?;
            Ok::<_, RedisError>(removed > 0)
        })
        .await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.execute("exists", key, |mut conn| async move {
            let present: bool = conn.exists(key).await?;
            Ok::<_, RedisError>(present)
        })
        .await
    }

    async fn scan(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.execute("scan", pattern, |mut conn| async move {
            let mut cursor: u64 = 0;
            let mut keys = Vec::new();
            loop {
                let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn)
                    .await?;
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            // SCAN may return a key more than once.
            keys.sort();
            keys.dedup();
            Ok::<_, RedisError>(keys)
        })
        .await
    }

    async fn clear(&self) -> CacheResult<()> {
        self.execute("clear", "*", |mut conn| async move {
            let (): () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
            Ok::<_, RedisError>(())
        })
        .await
    }

    async fn ping(&self) -> bool {
        self.execute("ping", "", |mut conn| async move {
            let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, RedisError>(reply)
        })
        .await
        .is_ok_and(|reply| reply.eq_ignore_ascii_case("PONG"))
    }

    async fn incr(&self, key: &str, delta: i64, ttl: Duration) -> CacheResult<i64> {
        let secs = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
        self.execute("incr", key, |mut conn| async move {
            let (value,): (i64,) = redis::pipe()
                .atomic()
                .incr(key, delta)
                .expire(key, secs)
                .ignore()
                .query_async(&mut conn)
                .await?;
            Ok::<_, RedisError>(value)
        })
        .await
    }

    async fn len(&self) -> CacheResult<u64> {
        self.execute("len", "", |mut conn| async move {
            let size: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
            Ok::<_, RedisError>(size)
        })
        .await
    }
}

impl std::fmt::Debug for RemoteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RemoteCache")
            .field("pool_size", &status.size)
            .field("available", &status.available)
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}
