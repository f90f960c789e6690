//! Cache key builders for every Gatehouse key.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

// ── Principal cache ────────────────────────────────────────

/// Cache key for a single user by ID.
pub fn user_by_id(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

/// Cache key for a user list query, keyed by its canonical fingerprint.
pub fn user_list(query_fingerprint: &str) -> String {
    format!("users:{query_fingerprint}")
}

/// Pattern matching every cached user list.
pub fn user_list_pattern() -> String {
    "users:*".to_string()
}

// ── Revocation store ───────────────────────────────────────

/// Denylist key for a revoked token's hex-encoded SHA-256 fingerprint.
pub fn revoked_token(fingerprint: &str) -> String {
    format!("blacklist:{fingerprint}")
}
