//! Cache and revocation store configuration.

use serde::{Deserialize, Serialize};

/// Principal cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider: `"redis"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Default TTL in seconds for cached entries.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// In-memory cache configuration.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            default_ttl_seconds: default_ttl(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

/// Behavior of the revocation check when the store cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationFailurePolicy {
    /// Treat the token as not revoked and log a warning.
    #[default]
    FailOpen,
    /// Treat the token as revoked.
    FailClosed,
}

/// Token revocation store configuration.
///
/// Shares the provider schema of [`CacheConfig`] so the denylist can live in
/// a separate Redis (or a separate key prefix) from the principal cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationConfig {
    /// Store provider: `"redis"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// In-memory store configuration.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
    /// Outcome of a revocation lookup that fails.
    #[serde(default)]
    pub failure_policy: RevocationFailurePolicy,
}

impl RevocationConfig {
    /// View this section as a cache configuration for building a store.
    pub fn as_cache_config(&self) -> CacheConfig {
        CacheConfig {
            provider: self.provider.clone(),
            default_ttl_seconds: default_ttl(),
            redis: self.redis.clone(),
            memory: self.memory.clone(),
        }
    }
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
            failure_policy: RevocationFailurePolicy::default(),
        }
    }
}

/// Redis connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix prepended to every key.
    #[serde(default)]
    pub key_prefix: String,
    /// Per-operation timeout in milliseconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
            operation_timeout_ms: default_operation_timeout(),
        }
    }
}

/// In-memory cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    3600
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_operation_timeout() -> u64 {
    250
}

fn default_max_capacity() -> u64 {
    100_000
}
