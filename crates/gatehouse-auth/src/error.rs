//! Typed failures at the authentication boundary.

use thiserror::Error;

use gatehouse_core::error::{AppError, ErrorKind};

/// Why a presented token was not honoured.
///
/// Only ever logged. Callers see the single [`AuthError::InvalidToken`]
/// message regardless of the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// The token's fingerprint is on the denylist.
    #[error("revoked")]
    Revoked,
    /// The token is not a well-formed JWT with the expected claims.
    #[error("malformed")]
    Malformed,
    /// The signature does not match the expected secret.
    #[error("bad signature")]
    BadSignature,
    /// `exp` has passed.
    #[error("expired")]
    Expired,
    /// An access token was presented where a refresh token was expected, or vice versa.
    #[error("wrong purpose")]
    WrongPurpose,
    /// The role claim is not a known role.
    #[error("unknown role")]
    UnknownRole,
    /// The principal no longer exists or has been deactivated.
    #[error("inactive principal")]
    InactivePrincipal,
}

/// Failure of an authentication operation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. One message for both.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Correct password for a deactivated account.
    #[error("Account is deactivated")]
    AccountDisabled,
    /// The email address is already registered.
    #[error("{0}")]
    Conflict(String),
    /// The token was rejected. The reason is internal only.
    #[error("Invalid or expired token")]
    InvalidToken(TokenRejection),
    /// The principal was not found.
    #[error("{0}")]
    NotFound(String),
    /// Malformed input.
    #[error("{0}")]
    Validation(String),
    /// Unexpected failure (store outage, hashing failure).
    #[error(transparent)]
    Internal(AppError),
}

/// Result alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// The internal rejection reason, if this is a token failure.
    pub fn rejection(&self) -> Option<TokenRejection> {
        match self {
            Self::InvalidToken(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Validation => Self::Validation(err.message),
            ErrorKind::Conflict => Self::Conflict(err.message),
            ErrorKind::NotFound => Self::NotFound(err.message),
            _ => Self::Internal(err),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                AppError::credentials(err.to_string())
            }
            AuthError::Conflict(message) => AppError::conflict(message),
            AuthError::InvalidToken(_) => AppError::authentication(err.to_string()),
            AuthError::NotFound(message) => AppError::not_found(message),
            AuthError::Validation(message) => AppError::validation(message),
            AuthError::Internal(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_share_one_message() {
        let reasons = [
            TokenRejection::Revoked,
            TokenRejection::BadSignature,
            TokenRejection::Expired,
            TokenRejection::Malformed,
        ];
        for reason in reasons {
            let app: AppError = AuthError::InvalidToken(reason).into();
            assert_eq!(app.kind, ErrorKind::Authentication);
            assert_eq!(app.message, "Invalid or expired token");
        }
    }

    #[test]
    fn test_credential_failures_map_to_bad_request() {
        let app: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(app.kind, ErrorKind::Credentials);
        assert_eq!(app.message, "Invalid email or password");
    }

    #[test]
    fn test_app_error_kinds_are_preserved() {
        let auth: AuthError = AppError::conflict("taken").into();
        assert!(matches!(auth, AuthError::Conflict(ref m) if m == "taken"));

        let auth: AuthError = AppError::database("down").into();
        let app: AppError = auth.into();
        assert_eq!(app.kind, ErrorKind::Database);
    }
}
