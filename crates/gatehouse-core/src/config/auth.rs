//! Token and password configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// HMAC secret for refresh tokens. Must differ from the access secret.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Refresh token lifetime in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_hours: u64,
    /// Issue a new refresh token on every refresh and revoke the old one.
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
    /// Minimum password length.
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_password_max_length")]
    pub password_max_length: usize,
    /// Require mixed character classes and a zxcvbn score of at least 3.
    #[serde(default)]
    pub require_strong_passwords: bool,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    /// Argon2id iterations.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2id lanes.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl AuthConfig {
    /// Access token lifetime in seconds.
    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.access_token_ttl_minutes.saturating_mul(60)
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_token_ttl_seconds(&self) -> u64 {
        self.refresh_token_ttl_hours.saturating_mul(3600)
    }

    /// Longest lifetime of any token this service issues.
    pub fn max_token_ttl_seconds(&self) -> u64 {
        self.access_token_ttl_seconds()
            .max(self.refresh_token_ttl_seconds())
    }

    /// Whether either secret is still the shipped placeholder.
    pub fn uses_placeholder_secrets(&self) -> bool {
        self.access_token_secret == default_access_secret()
            || self.refresh_token_secret == default_refresh_secret()
    }

    /// Reject empty or shared signing secrets, zero token lifetimes, and
    /// inverted length bounds.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AppError::configuration("Token secrets must not be empty"));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh token secrets must be distinct",
            ));
        }
        if self.access_token_ttl_minutes == 0 || self.refresh_token_ttl_hours == 0 {
            return Err(AppError::configuration(
                "auth.access_token_ttl_minutes and auth.refresh_token_ttl_hours must be positive",
            ));
        }
        if self.password_min_length > self.password_max_length {
            return Err(AppError::configuration(
                "auth.password_min_length exceeds auth.password_max_length",
            ));
        }
        if self.argon2_iterations == 0
            || self.argon2_parallelism == 0
            || self.argon2_memory_kib < 8 * self.argon2_parallelism
        {
            return Err(AppError::configuration(
                "auth.argon2_* must be non-zero and memory must be at least 8 KiB per lane",
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_secret: default_refresh_secret(),
            refresh_token_ttl_hours: default_refresh_ttl(),
            rotate_refresh_tokens: false,
            password_min_length: default_password_min_length(),
            password_max_length: default_password_max_length(),
            require_strong_passwords: false,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_access_secret() -> String {
    "change-me-access-secret".to_string()
}

fn default_refresh_secret() -> String {
    "change-me-refresh-secret".to_string()
}

fn default_access_ttl() -> u64 {
    7 * 24 * 60
}

fn default_refresh_ttl() -> u64 {
    30 * 24
}

fn default_password_min_length() -> usize {
    6
}

fn default_password_max_length() -> usize {
    100
}

fn default_argon2_memory_kib() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}
