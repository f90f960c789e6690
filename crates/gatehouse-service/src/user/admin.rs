//! Administrative user management: listing, lookup, deactivation.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use gatehouse_cache::PrincipalCache;
use gatehouse_core::error::AppError;
use gatehouse_core::types::PageResponse;
use gatehouse_database::UserRepository;
use gatehouse_entity::user::{UserProfile, UserQuery};

use super::service::load_profile;
use crate::context::RequestContext;

/// Admin-only user operations. Callers enforce the admin role.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    /// Primary store.
    users: Arc<dyn UserRepository>,
    /// Principal cache.
    cache: PrincipalCache,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(users: Arc<dyn UserRepository>, cache: PrincipalCache) -> Self {
        Self { users, cache }
    }

    /// Gets any user's profile.
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        load_profile(self.users.as_ref(), &self.cache, user_id).await
    }

    /// Lists users through the query cache.
    pub async fn list_users(
        &self,
        query: &UserQuery,
    ) -> Result<PageResponse<UserProfile>, AppError> {
        if let Some(page) = self.cache.get_user_list(query).await {
            debug!(query = %query.fingerprint(), "User list cache hit");
            return Ok(page);
        }

        let page = self.users.list(query).await?;
        let page = page.map(UserProfile::from);

        self.cache.set_user_list(query, &page).await;
        Ok(page)
    }

    /// Soft-deletes a user. The account can no longer log in or refresh.
    pub async fn deactivate_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<UserProfile, AppError> {
        let user = self.users.deactivate(user_id).await?;
        self.cache.invalidate(user.id).await;

        info!(user_id = %user.id, admin_id = %ctx.user_id(), "User deactivated");
        Ok(user.profile())
    }
}
