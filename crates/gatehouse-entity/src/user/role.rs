//! Account roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::AppError;

/// Role stored on the account and carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    /// User management and administrative token revocation.
    Admin,
}

impl UserRole {
    /// Every role a token may claim.
    pub const ALL: [UserRole; 2] = [UserRole::User, UserRole::Admin];

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }

    /// Wire and database spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, lowercase match. Token claims are minted from [`UserRole::as_str`],
/// so anything else did not come from this service.
impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown role '{s}'")))
    }
}
