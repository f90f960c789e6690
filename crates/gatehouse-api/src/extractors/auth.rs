//! `AuthUser` extractor: pulls the bearer token from the Authorization header,
//! verifies it, and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use gatehouse_auth::AuthError;
use gatehouse_core::error::AppError;
use gatehouse_service::context::RequestContext;

use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The token of an `Authorization: Bearer <token>` header, if present and well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Missing or ill-formed header: 401
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::authentication("Access token is required"))?;

        // Presented but not honoured: 403
        let principal = state
            .session_manager
            .authenticate(token)
            .await
            .map_err(|e: AuthError| {
                if let Some(reason) = e.rejection() {
                    debug!(reason = %reason, "Access token rejected");
                    return AppError::authorization(e.to_string());
                }
                AppError::from(e)
            })?;

        Ok(AuthUser(RequestContext::new(principal)))
    }
}
