//! JWT token creation with per-purpose signing secrets.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;

use super::claims::{Claims, TokenType};
use crate::principal::Principal;

/// Creates signed JWT access and refresh tokens. Performs no I/O.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC key for access tokens.
    access_key: EncodingKey,
    /// HMAC key for refresh tokens.
    refresh_key: EncodingKey,
    /// Access token lifetime.
    access_ttl: Duration,
    /// Refresh token lifetime.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_ttl_seconds() as i64),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_seconds() as i64),
        }
    }

    /// Issues a new access + refresh token pair for the principal.
    pub fn issue(&self, principal: &Principal) -> Result<TokenPair, AppError> {
        let (access_token, access_expires_at) = self.issue_access(principal)?;
        let (refresh_token, refresh_expires_at) = self.issue_refresh(principal)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Issues a standalone access token (e.g., after refresh).
    pub fn issue_access(&self, principal: &Principal) -> Result<(String, DateTime<Utc>), AppError> {
        self.sign(principal, TokenType::Access)
    }

    /// Issues a standalone refresh token (rotation).
    pub fn issue_refresh(
        &self,
        principal: &Principal,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        self.sign(principal, TokenType::Refresh)
    }

    fn sign(
        &self,
        principal: &Principal,
        token_type: TokenType,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let (key, ttl) = match token_type {
            TokenType::Access => (&self.access_key, self.access_ttl),
            TokenType::Refresh => (&self.refresh_key, self.refresh_ttl),
        };

        let now = Utc::now();
        let exp = now + ttl;
        let claims = Claims {
            principal_id: principal.id,
            role: principal.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        };

        let token = encode(&Header::default(), &claims, key).map_err(|e| {
            AppError::internal(format!(
                "Failed to encode {} token: {e}",
                token_type.as_str()
            ))
        })?;

        Ok((token, exp))
    }
}
