//! Admin-only handlers: user management and token revocation.

use axum::Json;
use axum::extract::{Path, Query, State};

use gatehouse_core::error::AppError;
use gatehouse_entity::user::UserQuery;

use crate::dto::request::{TokenRequest, validate_request};
use crate::dto::response::{ApiResponse, UserListResponse, UserResponse};
use crate::extractors::{AuthUser, JsonBody, parse_uuid};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<UserListResponse>>, AppError> {
    require_admin(&auth)?;

    let page = state.admin_user_service.list_users(&query).await?;
    Ok(Json(ApiResponse::ok(page.into())))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    require_admin(&auth)?;

    let profile = state.admin_user_service.get_user(parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(profile.into())))
}

/// DELETE /api/v1/users/{id}
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    require_admin(&auth)?;

    let user_id = parse_uuid(&id)?;
    if user_id == auth.user_id() {
        return Err(AppError::validation("You cannot deactivate your own account"));
    }

    let profile = state
        .admin_user_service
        .deactivate_user(&auth, user_id)
        .await?;

    Ok(Json(ApiResponse::with_message(
        profile.into(),
        "User deactivated successfully",
    )))
}

/// POST /api/v1/admin/tokens/revoke
pub async fn revoke_token(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<TokenRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&auth)?;
    validate_request(&req)?;

    state.session_manager.revoke_token(&req.token).await?;
    Ok(Json(ApiResponse::with_message((), "Token revoked")))
}

/// POST /api/v1/admin/tokens/restore
pub async fn restore_token(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<TokenRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&auth)?;
    validate_request(&req)?;

    state.session_manager.restore_token(&req.token).await?;
    Ok(Json(ApiResponse::with_message((), "Token restored")))
}
