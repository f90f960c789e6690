//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_auth::Principal;
use gatehouse_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built once by the token-verification step and passed read-only into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The verified identity.
    principal: Principal,
    /// When the request was received.
    request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context for a verified principal.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_time: Utc::now(),
        }
    }

    /// The verified identity.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// The authenticated user's ID.
    pub fn user_id(&self) -> Uuid {
        self.principal.id
    }

    /// The role the access token was issued with.
    pub fn role(&self) -> UserRole {
        self.principal.role
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.principal.is_admin()
    }

    /// When the request was received.
    pub fn request_time(&self) -> DateTime<Utc> {
        self.request_time
    }
}
