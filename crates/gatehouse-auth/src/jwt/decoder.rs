//! JWT token verification.
//!
//! Verification order is fixed: the revocation store is consulted before
//! the signature is checked, so a denylisted token is refused even while it
//! is still cryptographically valid.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use gatehouse_core::config::AuthConfig;
use gatehouse_entity::user::UserRole;

use super::claims::{Claims, TokenType};
use crate::error::{AuthError, AuthResult, TokenRejection};
use crate::principal::Principal;
use crate::revocation::RevocationStore;

/// A token that passed every check.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// The identity carried by the token.
    pub principal: Principal,
    /// The decoded claims.
    pub claims: Claims,
}

/// Validates signature, expiry, purpose, role, and revocation of tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC key for access tokens.
    access_key: DecodingKey,
    /// HMAC key for refresh tokens.
    refresh_key: DecodingKey,
    /// Signature validation settings. Expiry is checked separately.
    validation: Validation,
    /// Denylist of revoked tokens.
    revocation: RevocationStore,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

fn reject(reason: TokenRejection, purpose: TokenType) -> AuthError {
    debug!(reason = %reason, purpose = purpose.as_str(), "Token rejected");
    AuthError::InvalidToken(reason)
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig, revocation: RevocationStore) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            access_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            validation,
            revocation,
        }
    }

    /// Verifies an access token.
    pub async fn verify_access(&self, token: &str) -> AuthResult<VerifiedToken> {
        self.verify(token, TokenType::Access).await
    }

    /// Verifies a refresh token.
    pub async fn verify_refresh(&self, token: &str) -> AuthResult<VerifiedToken> {
        self.verify(token, TokenType::Refresh).await
    }

    /// Verifies a token against the secret for `purpose`.
    ///
    /// 1. Revocation lookup
    /// 2. Signature
    /// 3. Expiry
    /// 4. Purpose
    /// 5. Role
    pub async fn verify(&self, token: &str, purpose: TokenType) -> AuthResult<VerifiedToken> {
        if self.revocation.is_revoked(token).await {
            return Err(reject(TokenRejection::Revoked, purpose));
        }

        let key = match purpose {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };

        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| {
                let reason = match e.kind() {
                    JwtErrorKind::InvalidSignature => TokenRejection::BadSignature,
                    _ => TokenRejection::Malformed,
                };
                reject(reason, purpose)
            })?
            .claims;

        if Utc::now().timestamp() >= claims.exp {
            return Err(reject(TokenRejection::Expired, purpose));
        }

        if claims.token_type != purpose {
            return Err(reject(TokenRejection::WrongPurpose, purpose));
        }

        let role: UserRole = claims
            .role
            .parse()
            .map_err(|_| reject(TokenRejection::UnknownRole, purpose))?;

        Ok(VerifiedToken {
            principal: Principal {
                id: claims.principal_id,
                role,
            },
            claims,
        })
    }

    /// Decodes claims without checking signature, expiry, or revocation.
    ///
    /// Only for bookkeeping on tokens the caller is giving up (logout):
    /// nothing returned here may be trusted.
    pub fn peek_claims(token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }

    /// The revocation store this verifier consults.
    pub fn revocation(&self) -> &RevocationStore {
        &self.revocation
    }
}
