//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use gatehouse_core::error::AppError;

/// Runs the derived validation rules and folds failures into one message.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|e| AppError::validation(describe(&e)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut details: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid"),
            })
        })
        .collect();
    details.sort();
    format!("Validation failed: {}", details.join("; "))
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Full name, split into given and family names.
    #[validate(length(
        min = 2,
        max = 100,
        message = "Name must be between 2 and 100 characters"
    ))]
    pub name: String,
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password. Strength rules are applied by the password policy.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token.
    #[serde(default)]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Optional logout body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// A refresh token to revoke alongside the bearer token.
    pub refresh_token: Option<String>,
}

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Given name.
    #[validate(length(max = 50, message = "First name must be less than 50 characters"))]
    pub first_name: Option<String>,
    /// Family name.
    #[validate(length(max = 50, message = "Last name must be less than 50 characters"))]
    pub last_name: Option<String>,
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// A raw token submitted for administrative revocation or restore.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    /// The token.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// `GET /users/check-email` query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckEmailQuery {
    /// Email to check.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
