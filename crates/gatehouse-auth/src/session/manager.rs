//! Session lifecycle manager: register, login, refresh, and logout flows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use gatehouse_cache::PrincipalCache;
use gatehouse_core::config::AuthConfig;
use gatehouse_database::UserRepository;
use gatehouse_entity::user::{CreateUser, User, UserRole};

use crate::credential::{CredentialVerifier, normalize_email};
use crate::error::{AuthError, AuthResult, TokenRejection};
use crate::jwt::{Claims, TokenIssuer, TokenPair, TokenVerifier};
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::principal::Principal;
use crate::revocation::RevocationStore;

/// Message for a registration with an email that is already taken.
const EMAIL_REGISTERED: &str = "User with this email already exists";

/// Input to [`SessionManager::register`].
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Free-form display name; split into given and family names.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user.
    pub user: User,
    /// Freshly issued tokens.
    pub tokens: TokenPair,
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// New access token.
    pub access_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Replacement refresh token, present only when rotation is enabled.
    pub refresh_token: Option<String>,
}

/// Orchestrates credential checks, token issuance, verification, and revocation.
///
/// This is the single entry point the HTTP layer uses for authentication.
#[derive(Clone)]
pub struct SessionManager {
    /// Primary store.
    users: Arc<dyn UserRepository>,
    /// Password hasher.
    hasher: PasswordHasher,
    /// Policy for new passwords.
    policy: PasswordPolicy,
    /// Email/password verification.
    credentials: CredentialVerifier,
    /// Token signing.
    issuer: TokenIssuer,
    /// Token verification (including revocation).
    verifier: TokenVerifier,
    /// Principal cache, invalidated when a registration changes user lists.
    principal_cache: PrincipalCache,
    /// Whether refresh revokes and replaces the presented refresh token.
    rotate_refresh_tokens: bool,
    /// Upper bound on a denylist entry's lifetime.
    max_token_ttl_seconds: u64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("issuer", &self.issuer)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserRepository>,
        revocation: RevocationStore,
        principal_cache: PrincipalCache,
    ) -> Self {
        let hasher = PasswordHasher::from_config(config);
        Self {
            credentials: CredentialVerifier::new(users.clone(), hasher.clone()),
            users,
            hasher,
            policy: PasswordPolicy::new(config),
            issuer: TokenIssuer::new(config),
            verifier: TokenVerifier::new(config, revocation),
            principal_cache,
            rotate_refresh_tokens: config.rotate_refresh_tokens,
            max_token_ttl_seconds: config.max_token_ttl_seconds(),
        }
    }

    /// Registers a new user and issues tokens.
    ///
    /// Fails with `Conflict` if the email is taken and `Validation` if the
    /// password violates the policy.
    pub async fn register(&self, request: &RegisterRequest) -> AuthResult<AuthSession> {
        self.policy.validate(&request.password)?;

        let email = normalize_email(&request.email);
        if self.users.exists_by_email(&email).await? {
            return Err(AuthError::Conflict(EMAIL_REGISTERED.to_string()));
        }

        let (first_name, last_name) = CreateUser::split_name(&request.name);
        let data = CreateUser {
            email,
            password_hash: self.hasher.hash_password_async(&request.password).await?,
            first_name,
            last_name,
            role: UserRole::User,
        };

        // A concurrent registration can still win the race to the unique index.
        let user = self.users.create(&data).await.map_err(|e| {
            match AuthError::from(e) {
                AuthError::Conflict(_) => AuthError::Conflict(EMAIL_REGISTERED.to_string()),
                other => other,
            }
        })?;

        self.principal_cache.invalidate_lists().await;

        let tokens = self.issuer.issue(&Principal::from(&user))?;
        info!(user_id = %user.id, "User registered");

        Ok(AuthSession { user, tokens })
    }

    /// Verifies credentials and issues tokens.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let user = self.credentials.verify(email, password).await?;
        let tokens = self.issuer.issue(&Principal::from(&user))?;

        info!(user_id = %user.id, "Login successful");
        Ok(AuthSession { user, tokens })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// 1. Verify the refresh token (revocation, signature, expiry, purpose)
    /// 2. With rotation enabled, claim the presented token on the denylist;
    ///    of concurrent refreshes with the same token only the claimant goes on
    /// 3. Reload the user from the primary store, bypassing the cache
    /// 4. Issue an access token with the user's current role, plus a new
    ///    refresh token when rotating
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshedTokens> {
        let verified = self.verifier.verify_refresh(refresh_token).await?;
        let user_id = verified.principal.id;

        if self.rotate_refresh_tokens {
            let claimed = self
                .verifier
                .revocation()
                .claim(refresh_token, self.revocation_ttl(&verified.claims))
                .await?;
            if !claimed {
                warn!(user_id = %user_id, "Refresh token reused during rotation");
                return Err(AuthError::InvalidToken(TokenRejection::Revoked));
            }
        }

        let user = match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => user,
            _ => {
                warn!(user_id = %user_id, "Refresh for missing or deactivated user");
                return Err(AuthError::InvalidToken(TokenRejection::InactivePrincipal));
            }
        };

        let principal = Principal::from(&user);
        let (access_token, access_expires_at) = self.issuer.issue_access(&principal)?;

        let refresh_token = if self.rotate_refresh_tokens {
            let (token, _) = self.issuer.issue_refresh(&principal)?;
            Some(token)
        } else {
            None
        };

        info!(
            user_id = %user.id,
            rotated = refresh_token.is_some(),
            "Token refreshed"
        );

        Ok(RefreshedTokens {
            access_token,
            access_expires_at,
            refresh_token,
        })
    }

    /// Revokes a token for the rest of its lifetime.
    ///
    /// Never fails: undecodable tokens, expired tokens, and store errors are
    /// logged and ignored. The client discards its token either way.
    pub async fn logout(&self, token: &str) {
        let Some(claims) = TokenVerifier::peek_claims(token) else {
            debug!("Logout with undecodable token");
            return;
        };

        let ttl = self.revocation_ttl(&claims);
        match self.verifier.revocation().revoke(token, ttl).await {
            Ok(()) => info!(
                user_id = %claims.principal_id,
                token_type = claims.token_type.as_str(),
                "Token revoked on logout"
            ),
            Err(e) => warn!(
                user_id = %claims.principal_id,
                error = %e,
                "Failed to revoke token on logout"
            ),
        }
    }

    /// Verifies an access token and returns its principal.
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<Principal> {
        Ok(self.verifier.verify_access(access_token).await?.principal)
    }

    /// Administratively revokes any token issued by this service.
    ///
    /// Fails with `Validation` if the token cannot be decoded. A token that
    /// has already expired is accepted and nothing is recorded.
    pub async fn revoke_token(&self, token: &str) -> AuthResult<()> {
        let claims = TokenVerifier::peek_claims(token)
            .ok_or_else(|| AuthError::Validation("Token could not be decoded".to_string()))?;

        self.verifier
            .revocation()
            .revoke(token, self.revocation_ttl(&claims))
            .await?;

        info!(
            user_id = %claims.principal_id,
            token_type = claims.token_type.as_str(),
            "Token revoked by administrator"
        );
        Ok(())
    }

    /// Administratively removes a token from the denylist.
    pub async fn restore_token(&self, token: &str) -> AuthResult<()> {
        self.verifier.revocation().unrevoke(token).await?;
        Ok(())
    }

    /// Denylist lifetime for a token: its remaining lifetime, capped at the
    /// longest lifetime this service issues. Claims passed here may be
    /// unverified, so `exp` alone cannot be trusted.
    fn revocation_ttl(&self, claims: &Claims) -> u64 {
        claims.remaining_ttl_seconds().min(self.max_token_ttl_seconds)
    }

    /// The token verifier (for health reporting and tests).
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}
