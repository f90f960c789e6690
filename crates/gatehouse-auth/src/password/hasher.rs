//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;

/// Hashes and verifies passwords with Argon2id at a configured cost.
///
/// Stored hashes carry their own parameters, so hashes made at an older
/// cost keep verifying; [`PasswordHasher::needs_rehash`] reports them.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: Params,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl PasswordHasher {
    /// Creates a hasher with the Argon2id defaults (19 MiB, 2 passes, 1 lane).
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Creates a hasher with the cost from `auth.argon2_*`.
    ///
    /// Out-of-range values fall back to the defaults; startup validation
    /// rejects them before this point.
    pub fn from_config(config: &AuthConfig) -> Self {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .unwrap_or_else(|e| {
            warn!(error = %e, "Invalid Argon2 parameters, using defaults");
            Params::default()
        });
        Self::with_params(params)
    }

    fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
            params,
        }
    }

    /// Hashes a plaintext password with a random salt. Returns a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only for an unreadable hash.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// [`PasswordHasher::hash_password`] on the blocking pool.
    ///
    /// Argon2 is deliberately slow; request handlers call this so the hash
    /// does not stall the async worker it runs on.
    pub async fn hash_password_async(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let password = password.to_owned();
        run_blocking(move || hasher.hash_password(&password)).await
    }

    /// [`PasswordHasher::verify_password`] on the blocking pool.
    pub async fn verify_password_async(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = self.clone();
        let (password, hash) = (password.to_owned(), hash.to_owned());
        run_blocking(move || hasher.verify_password(&password, &hash)).await
    }

    /// Whether a stored hash uses a different algorithm or cost than this hasher.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }
        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != self.params.m_cost()
                    || stored.t_cost() != self.params.t_cost()
                    || stored.p_cost() != self.params.p_cost()
            }
            Err(_) => true,
        }
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::from_config(&AuthConfig {
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..Default::default()
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("secret12").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secret12", &hash).unwrap());
        assert!(!hasher.verify_password("secret13", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_async_variants_leave_the_runtime_free() {
        let hasher = PasswordHasher::new();
        let hashing = {
            let hasher = hasher.clone();
            tokio::spawn(async move { hasher.hash_password_async("secret12").await })
        };

        // Single-threaded runtime: this loop only spins if the hash runs elsewhere.
        let mut polls = 0u32;
        while !hashing.is_finished() {
            polls += 1;
            tokio::task::yield_now().await;
        }
        assert!(polls > 1, "hashing held the runtime thread");

        let hash = hashing.await.unwrap().unwrap();
        assert!(hasher.verify_password_async("secret12", &hash).await.unwrap());
        assert!(!hasher.verify_password_async("secret13", &hash).await.unwrap());
        assert!(hasher.verify_password_async("x", "not-a-phc-string").await.is_err());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = cheap();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_cost_change_is_detected_but_still_verifies() {
        let old = cheap();
        let current = PasswordHasher::new();
        let hash = old.hash_password("secret12").unwrap();

        assert!(hash.contains("m=1024,t=1"));
        assert!(!old.needs_rehash(&hash));
        assert!(current.needs_rehash(&hash));
        assert!(current.verify_password("secret12", &hash).unwrap());
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let hasher = PasswordHasher::from_config(&AuthConfig {
            argon2_iterations: 0,
            ..Default::default()
        });
        let hash = PasswordHasher::new().hash_password("x").unwrap();
        assert!(!hasher.needs_rehash(&hash));
    }
}
