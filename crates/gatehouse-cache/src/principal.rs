//! Fail-open read-through cache for user records.
//!
//! Every operation here swallows backing-store errors: a failed read is a
//! miss, a failed write or invalidation is logged and ignored. The primary
//! store stays the source of truth and entries expire after the configured
//! TTL, which bounds how stale a missed invalidation can leave a reader.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use gatehouse_core::traits::cache::CacheProvider;
use gatehouse_core::types::PageResponse;
use gatehouse_entity::user::{UserProfile, UserQuery};

use crate::keys;
use crate::provider::CacheManager;

/// Principal cache over a [`CacheManager`].
#[derive(Debug, Clone)]
pub struct PrincipalCache {
    cache: CacheManager,
}

impl PrincipalCache {
    /// Create a principal cache.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Read and decode a cached JSON value. Any failure is reported as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                if let Err(e) = self.cache.delete(key).await {
                    debug!(key, error = %e, "Failed to delete undecodable cache entry");
                }
                None
            }
        }
    }

    /// Encode and store a JSON value with the default TTL. Failures are logged.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.cache.set(key, &raw, self.cache.default_ttl()).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }

    /// Drop the entity key for a user and every cached user list.
    ///
    /// The entity key is removed first so that a single-user read never
    /// observes the pre-mutation value once this returns. List keys are
    /// swept best-effort.
    pub async fn invalidate(&self, user_id: Uuid) {
        let key = keys::user_by_id(user_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(user_id = %user_id, error = %e, "Failed to invalidate cached user");
        }
        self.invalidate_lists().await;
    }

    /// Drop every cached user list.
    pub async fn invalidate_lists(&self) {
        match self.cache.delete_pattern(&keys::user_list_pattern()).await {
            Ok(count) => debug!(count, "Invalidated cached user lists"),
            Err(e) => warn!(error = %e, "Failed to invalidate cached user lists"),
        }
    }

    /// Cached profile for a user.
    pub async fn get_user(&self, user_id: Uuid) -> Option<UserProfile> {
        self.get_json(&keys::user_by_id(user_id)).await
    }

    /// Cache a user's profile.
    pub async fn set_user(&self, profile: &UserProfile) {
        self.set_json(&keys::user_by_id(profile.id), profile).await;
    }

    /// Cached result page for a user list query.
    pub async fn get_user_list(&self, query: &UserQuery) -> Option<PageResponse<UserProfile>> {
        self.get_json(&keys::user_list(&query.fingerprint())).await
    }

    /// Cache a result page for a user list query.
    pub async fn set_user_list(&self, query: &UserQuery, page: &PageResponse<UserProfile>) {
        self.set_json(&keys::user_list(&query.fingerprint()), page)
            .await;
    }

    /// Check that the backing store is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.cache.health_check().await.unwrap_or(false)
    }
}
