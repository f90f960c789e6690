//! The authenticated identity carried by a verified token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_entity::user::{User, UserRole};

/// Identity reconstructed from a verified token. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user ID.
    pub id: Uuid,
    /// The role the token was issued with.
    pub role: UserRole,
}

impl Principal {
    /// Check if this principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}
