//! Redis provider over a reconnecting multiplexed connection.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use tracing::{debug, info};

use gatehouse_core::config::cache::RedisCacheConfig;
use gatehouse_core::config::redact_url;
use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::cache::CacheProvider;

/// Keys requested per `SCAN` round trip.
const SCAN_BATCH: usize = 100;

/// Redis-backed [`CacheProvider`].
///
/// Every command runs under `operation_timeout`; a timeout is reported as a
/// `Cache` error, the same as an unreachable server.
#[derive(Clone)]
pub struct RedisCacheProvider {
    conn: ConnectionManager,
    key_prefix: String,
    operation_timeout: Duration,
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("key_prefix", &self.key_prefix)
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisCacheProvider {
    /// Open a connection manager for `config.url`.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(url = %redact_url(&config.url), prefix = %config.key_prefix, "Connecting to Redis");

        let client = redis::Client::open(config.url.as_str()).map_err(redis_error)?;
        let conn = ConnectionManager::new(client).await.map_err(redis_error)?;

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    async fn timed<T>(&self, fut: impl Future<Output = RedisResult<T>>) -> AppResult<T> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result.map_err(redis_error),
            Err(_) => Err(AppError::cache(format!(
                "Redis command exceeded {} ms",
                self.operation_timeout.as_millis()
            ))),
        }
    }
}

fn redis_error(e: redis::RedisError) -> AppError {
    AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        self.timed(conn.get(self.key(key))).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        if ttl.as_secs() == 0 {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        // SET EX: value and expiry land together or not at all.
        self.timed(conn.set_ex::<_, _, ()>(self.key(key), value, ttl.as_secs()))
            .await
    }

    /// `SET NX EX`; Redis replies nil when the key already exists.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        if ttl.as_secs() == 0 {
            return Ok(false);
        }
        let mut conn = self.conn.clone();
        let reply: Option<String> = self
            .timed(
                redis::cmd("SET")
                    .arg(self.key(key))
                    .arg(value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl.as_secs())
                    .query_async(&mut conn),
            )
            .await?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        self.timed(conn.del::<_, ()>(self.key(key))).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        self.timed(conn.exists(self.key(key))).await
    }

    /// Cursor-based `SCAN MATCH` then `DEL` per batch; never `KEYS`.
    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let pattern = self.key(pattern);
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed = 0u64;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .timed(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                removed += self.timed(conn.del::<_, u64>(&keys)).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(%pattern, removed, "Swept keys by pattern");
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let pong: String = self.timed(redis::cmd("PING").query_async(&mut conn)).await?;
        Ok(pong == "PONG")
    }
}
