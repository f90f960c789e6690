//! Token revocation denylist.
//!
//! A revoked token is recorded as `blacklist:<hex sha256(token)>` with an
//! expiry equal to the token's remaining lifetime, so entries disappear on
//! their own once the token could no longer be honoured anyway. The raw
//! token is never stored.

use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use gatehouse_cache::CacheManager;
use gatehouse_cache::keys;
use gatehouse_core::config::RevocationFailurePolicy;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::cache::CacheProvider;

/// Value stored under each denylist key.
const REVOKED_MARKER: &str = "true";

/// Hex-encoded SHA-256 fingerprint of a raw token.
pub fn fingerprint(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Denylist of revoked token fingerprints.
#[derive(Debug, Clone)]
pub struct RevocationStore {
    /// Backing key/expiry store.
    store: CacheManager,
    /// Outcome of a lookup that cannot reach the store.
    failure_policy: RevocationFailurePolicy,
}

impl RevocationStore {
    /// Create a revocation store over a cache manager.
    pub fn new(store: CacheManager, failure_policy: RevocationFailurePolicy) -> Self {
        Self {
            store,
            failure_policy,
        }
    }

    /// Denylist a token for `remaining_ttl_seconds`.
    ///
    /// A token with no remaining lifetime is already unusable and is not
    /// recorded. The write is a single `SET .. EX`, so the entry either
    /// exists with its full expiry or not at all.
    pub async fn revoke(&self, raw_token: &str, remaining_ttl_seconds: u64) -> AppResult<()> {
        if remaining_ttl_seconds == 0 {
            return Ok(());
        }

        let key = keys::revoked_token(&fingerprint(raw_token));
        self.store
            .set(
                &key,
                REVOKED_MARKER,
                Duration::from_secs(remaining_ttl_seconds),
            )
            .await
    }

    /// Atomically denylist a token unless it is already there.
    ///
    /// Returns `true` for exactly one of any number of concurrent callers
    /// presenting the same token; that caller owns the token's single use.
    /// The entry lives at least one second so a token at the edge of expiry
    /// can still only be claimed once.
    pub async fn claim(&self, raw_token: &str, remaining_ttl_seconds: u64) -> AppResult<bool> {
        let key = keys::revoked_token(&fingerprint(raw_token));
        self.store
            .set_if_absent(
                &key,
                REVOKED_MARKER,
                Duration::from_secs(remaining_ttl_seconds.max(1)),
            )
            .await
    }

    /// Whether the token is on the denylist.
    ///
    /// A lookup that fails follows the configured policy: `FailOpen`
    /// reports "not revoked", `FailClosed` reports "revoked".
    pub async fn is_revoked(&self, raw_token: &str) -> bool {
        let key = keys::revoked_token(&fingerprint(raw_token));
        match self.store.exists(&key).await {
            Ok(revoked) => revoked,
            Err(e) => {
                let revoked = self.failure_policy == RevocationFailurePolicy::FailClosed;
                warn!(
                    error = %e,
                    policy = ?self.failure_policy,
                    treated_as_revoked = revoked,
                    "Revocation store unavailable"
                );
                revoked
            }
        }
    }

    /// Remove a token from the denylist (administrative restore).
    pub async fn unrevoke(&self, raw_token: &str) -> AppResult<()> {
        let fp = fingerprint(raw_token);
        self.store.delete(&keys::revoked_token(&fp)).await?;
        info!(fingerprint = %fp, "Token removed from denylist");
        Ok(())
    }

    /// Check that the backing store is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }
}
