//! User self-service operations: profile viewing, profile updates, password changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use gatehouse_auth::credential::normalize_email;
use gatehouse_auth::{PasswordHasher, PasswordPolicy};
use gatehouse_cache::PrincipalCache;
use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::UserRepository;
use gatehouse_entity::user::{UpdateUser, UserProfile};

use crate::context::RequestContext;

/// Read a user's profile through the principal cache.
///
/// Cache hit: returned as is. Miss: loaded from the primary store and
/// written back. Cache failures are misses.
pub(crate) async fn load_profile(
    users: &dyn UserRepository,
    cache: &PrincipalCache,
    user_id: Uuid,
) -> Result<UserProfile, AppError> {
    if let Some(profile) = cache.get_user(user_id).await {
        debug!(user_id = %user_id, "Principal cache hit");
        return Ok(profile);
    }

    let profile = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?
        .profile();

    cache.set_user(&profile).await;
    Ok(profile)
}

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// Primary store.
    users: Arc<dyn UserRepository>,
    /// Principal cache.
    cache: PrincipalCache,
    /// Password hasher.
    hasher: PasswordHasher,
    /// Policy for new passwords.
    policy: PasswordPolicy,
}

/// Data for updating a user's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New email address.
    pub email: Option<String>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserRepository>, cache: PrincipalCache, config: &AuthConfig) -> Self {
        Self {
            users,
            cache,
            hasher: PasswordHasher::from_config(config),
            policy: PasswordPolicy::new(config),
        }
    }

    /// Gets the current user's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<UserProfile, AppError> {
        load_profile(self.users.as_ref(), &self.cache, ctx.user_id()).await
    }

    /// Updates the current user's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> Result<UserProfile, AppError> {
        let mut patch = UpdateUser::default();

        if let Some(first_name) = req.first_name {
            let first_name = first_name.trim();
            if first_name.is_empty() {
                return Err(AppError::validation("First name cannot be empty"));
            }
            patch.first_name = Some(first_name.to_string());
        }

        if let Some(last_name) = req.last_name {
            patch.last_name = Some(last_name.trim().to_string());
        }

        if let Some(email) = req.email {
            let email = normalize_email(&email);
            if !email.contains('@') || !email.contains('.') {
                return Err(AppError::validation("Invalid email format"));
            }

            if let Some(existing) = self.users.find_by_email(&email).await? {
                if existing.id != ctx.user_id() {
                    return Err(AppError::conflict("Email is already in use"));
                }
            }

            patch.email = Some(email);
        }

        if patch.is_empty() {
            return self.get_profile(ctx).await;
        }

        let user = self.users.update(ctx.user_id(), &patch).await?;
        self.cache.invalidate(user.id).await;

        info!(user_id = %user.id, "Profile updated");
        Ok(user.profile())
    }

    /// Changes the current user's password.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_id(ctx.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let valid = self
            .hasher
            .verify_password_async(current_password, &user.password_hash)
            .await?;
        if !valid {
            return Err(AppError::validation("Current password is incorrect"));
        }

        self.policy.validate_change(current_password, new_password)?;

        let new_hash = self.hasher.hash_password_async(new_password).await?;
        self.users.update_password(user.id, &new_hash).await?;
        self.cache.invalidate(user.id).await;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Whether an email address is free to register.
    pub async fn email_available(&self, email: &str) -> Result<bool, AppError> {
        let taken = self.users.exists_by_email(&normalize_email(email)).await?;
        Ok(!taken)
    }
}
