//! Auth handlers: register, login, refresh, logout, me.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::debug;

use gatehouse_auth::AuthError;
use gatehouse_auth::session::{AuthSession, RegisterRequest as NewRegistration};
use gatehouse_core::error::AppError;

use crate::dto::request::{
    LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, validate_request,
};
use crate::dto::response::{ApiResponse, AuthResponse, RefreshResponse, UserResponse};
use crate::extractors::{AuthUser, JsonBody, bearer_token};
use crate::state::AppState;

fn auth_response(session: AuthSession) -> AuthResponse {
    AuthResponse {
        user: session.user.into(),
        token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
        expires_at: session.tokens.access_expires_at,
        refresh_expires_at: session.tokens.refresh_expires_at,
    }
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    validate_request(&req)?;

    let session = state
        .session_manager
        .register(&NewRegistration {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await
        .map_err(|e| match e {
            // Registration reports a taken email as a bad request.
            AuthError::Conflict(message) => AppError::validation(message),
            other => AppError::from(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            auth_response(session),
            "User registered successfully",
        )),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    validate_request(&req)?;

    let session = state
        .session_manager
        .login(&req.email, &req.password)
        .await?;

    Ok(Json(ApiResponse::with_message(
        auth_response(session),
        "Login successful",
    )))
}

/// POST /api/v1/auth/refresh
///
/// Any token failure is a 401 here, unlike protected routes.
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, AppError> {
    validate_request(&req)?;

    let tokens = state
        .session_manager
        .refresh(&req.refresh_token)
        .await
        .inspect_err(|e| {
            if let Some(reason) = e.rejection() {
                debug!(reason = %reason, "Refresh token rejected");
            }
        })?;

    Ok(Json(ApiResponse::with_message(
        RefreshResponse {
            access_token: tokens.access_token,
            expires_at: tokens.access_expires_at,
            refresh_token: tokens.refresh_token,
        },
        "Token refreshed successfully",
    )))
}

/// POST /api/v1/auth/logout
///
/// Always 200 with an empty body.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.session_manager.logout(token).await;
    }

    if let Ok(LogoutRequest {
        refresh_token: Some(refresh_token),
    }) = serde_json::from_slice::<LogoutRequest>(&body)
    {
        state.session_manager.logout(&refresh_token).await;
    }

    StatusCode::OK
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let profile = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(profile.into())))
}
