//! User self-service handlers.

use axum::Json;
use axum::extract::{Query, State};

use gatehouse_core::error::AppError;
use gatehouse_service::UpdateProfileRequest as ProfilePatch;

use crate::dto::request::{
    ChangePasswordRequest, CheckEmailQuery, UpdateProfileRequest, validate_request,
};
use crate::dto::response::{ApiResponse, EmailAvailabilityResponse, UserResponse};
use crate::extractors::{AuthUser, JsonBody};
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let profile = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(profile.into())))
}

/// PUT /api/v1/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    validate_request(&req)?;

    let profile = state
        .user_service
        .update_profile(
            &auth,
            ProfilePatch {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        profile.into(),
        "Profile updated successfully",
    )))
}

/// PUT /api/v1/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    validate_request(&req)?;

    state
        .user_service
        .change_password(&auth, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::with_message(
        (),
        "Password changed successfully",
    )))
}

/// GET /api/v1/users/check-email?email=
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<CheckEmailQuery>,
) -> Result<Json<ApiResponse<EmailAvailabilityResponse>>, AppError> {
    validate_request(&query)?;

    let available = state.user_service.email_available(&query.email).await?;
    Ok(Json(ApiResponse::ok(EmailAvailabilityResponse { available })))
}
