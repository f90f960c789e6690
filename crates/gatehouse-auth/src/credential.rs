//! Email/password verification.
//!
//! Unknown email and wrong password fail with the same error after the same
//! amount of hashing work, so neither the response nor its timing reveals
//! whether an address is registered.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use gatehouse_database::UserRepository;
use gatehouse_entity::user::User;

use crate::error::{AuthError, AuthResult};
use crate::password::PasswordHasher;

/// Password used to build the hash that unknown emails are checked against.
const TIMING_DUMMY_PASSWORD: &str = "gatehouse-timing-equalizer";

/// Checks an email/password pair against stored password hashes.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    /// Primary store.
    users: Arc<dyn UserRepository>,
    /// Password hasher.
    hasher: PasswordHasher,
    /// Hash verified on unknown emails. Built on first use.
    dummy_hash: Arc<OnceCell<Option<String>>>,
}

/// Normalize an email for lookup and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CredentialVerifier {
    /// Create a new verifier.
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Verify credentials and return the matching active user.
    ///
    /// Fails with [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password. [`AuthError::AccountDisabled`] is only reported once
    /// the password has been proven correct.
    pub async fn verify(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.burn_dummy_verification(password).await;
            debug!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_password_async(password, &user.password_hash)
            .await?
        {
            debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login attempt on deactivated account");
            return Err(AuthError::AccountDisabled);
        }

        if self.hasher.needs_rehash(&user.password_hash) {
            self.upgrade_hash(&user, password).await;
        }

        Ok(user)
    }

    /// Re-hash a verified password at the current cost. Best-effort.
    async fn upgrade_hash(&self, user: &User, password: &str) {
        let result = match self.hasher.hash_password_async(password).await {
            Ok(hash) => self.users.update_password(user.id, &hash).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(user_id = %user.id, "Password hash upgraded"),
            Err(e) => warn!(user_id = %user.id, error = %e, "Password hash upgrade failed"),
        }
    }

    /// Spend the same Argon2 work a real verification would.
    async fn burn_dummy_verification(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| async {
                self.hasher
                    .hash_password_async(TIMING_DUMMY_PASSWORD)
                    .await
                    .ok()
            })
            .await;
        if let Some(hash) = dummy {
            let _ = self.hasher.verify_password_async(password, hash).await;
        }
    }
}
