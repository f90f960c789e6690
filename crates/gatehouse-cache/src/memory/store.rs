//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use gatehouse_core::config::cache::MemoryCacheConfig;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::cache::CacheProvider;

/// A stored value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was inserted with.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CacheEntry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

/// Glob match supporting `*` (any run of characters), as used by Redis `MATCH`.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((head, rest)) => {
            let Some(tail) = key.strip_prefix(head) else {
                return false;
            };
            if rest.is_empty() {
                return true;
            }
            (0..=tail.len())
                .filter(|i| tail.is_char_boundary(*i))
                .any(|i| glob_match(rest, &tail[i..]))
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }
        let entry = CacheEntry {
            value: value.to_string(),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        if ttl.is_zero() {
            return Ok(false);
        }
        let entry = CacheEntry {
            value: value.to_string(),
            ttl,
        };
        // moka runs at most one init future per key; everyone else gets the stored entry.
        let stored = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async move { entry })
            .await;
        Ok(stored.is_fresh())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| key.to_string())
            .collect();

        let mut count = 0u64;
        for key in keys_to_remove {
            if self.cache.remove(&key).await.is_some() {
                count += 1;
            }
        }

        debug!(pattern, count, "Deleted keys matching pattern");
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
        assert!(provider.exists("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        assert_eq!(provider.get("key2").await.unwrap(), None);
        provider.delete("never-set").await.unwrap();
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let provider = make_provider();
        provider
            .set("short", "v", Duration::from_millis(50))
            .await
            .unwrap();
        provider
            .set("long", "v", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(provider.get("short").await.unwrap(), None);
        assert!(!provider.exists("short").await.unwrap());
        assert_eq!(provider.get("long").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_zero_ttl_stores_nothing() {
        let provider = make_provider();
        provider.set("gone", "v", Duration::ZERO).await.unwrap();
        assert!(!provider.exists("gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_if_absent_keeps_first_writer() {
        let provider = make_provider();
        let ttl = Duration::from_secs(60);

        assert!(provider.set_if_absent("claim", "first", ttl).await.unwrap());
        assert!(!provider.set_if_absent("claim", "second", ttl).await.unwrap());
        assert_eq!(provider.get("claim").await.unwrap(), Some("first".to_string()));

        provider.delete("claim").await.unwrap();
        assert!(provider.set_if_absent("claim", "third", ttl).await.unwrap());
        assert!(!provider.set_if_absent("other", "v", Duration::ZERO).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_set_if_absent_has_one_winner() {
        let provider = make_provider();
        let ttl = Duration::from_secs(60);

        let (a, b, c) = tokio::join!(
            provider.set_if_absent("race", "a", ttl),
            provider.set_if_absent("race", "b", ttl),
            provider.set_if_absent("race", "c", ttl),
        );
        let wins = [a.unwrap(), b.unwrap(), c.unwrap()]
            .into_iter()
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let provider = make_provider();
        let ttl = Duration::from_secs(60);
        provider.set("users:page=1", "a", ttl).await.unwrap();
        provider.set("users:page=2", "b", ttl).await.unwrap();
        provider.set("user:42", "c", ttl).await.unwrap();
        provider.cache.run_pending_tasks().await;

        let removed = provider.delete_pattern("users:*").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(provider.get("users:page=1").await.unwrap(), None);
        assert_eq!(provider.get("user:42").await.unwrap(), Some("c".to_string()));
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("users:*", "users:page=1"));
        assert!(glob_match("*:42", "user:42"));
        assert!(glob_match("a*c*e", "abcde"));
        assert!(!glob_match("users:*", "user:1"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
    }
}
