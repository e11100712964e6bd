//! Account endpoints under `/api/admin`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::AuthAccount;
use super::validation::{validate_email, validate_required};
use super::{
    ApiError, ApiJson, ApiResponse, AppState, ForgotPasswordRequest, LoginRequest, MessageResponse,
    ResetPasswordRequest,
};
use crate::services::{AccountProfile, AuthSession, ProfileUpdate, Registration};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, you will receive a link to reset your password";

/// POST /admin/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<Registration>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ApiError> {
    validate_email(&payload.email)?;
    validate_required(&payload.name, "Name")?;
    validate_required(&payload.restaurant_name, "Restaurant name")?;

    let session = state.auth_service().register(payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let session = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(session)))
}

/// GET /admin/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
) -> Result<Json<ApiResponse<AccountProfile>>, ApiError> {
    let profile = state.auth_service().profile(account_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /admin/profile
/// Returns the updated profile with a fresh token.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }

    let session = state
        .auth_service()
        .update_profile(account_id, payload)
        .await?;

    Ok(Json(ApiResponse::success(session)))
}

/// POST /admin/forgot-password
/// Answers identically whether or not the email exists.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_required(&payload.email, "Email")?;

    state.auth_service().forgot_password(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        FORGOT_PASSWORD_MESSAGE,
    ))))
}

/// POST /admin/reset-password/{token}
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .reset_password(&token, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}
