//! The caller's own menu: creation, theme and public link.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::auth::AuthAccount;
use super::{ApiError, ApiJson, ApiResponse, AppState};
use crate::models::theme::{Theme, ThemeUpdate};
use crate::services::{CreateMenu, MenuView};

/// POST /menu
pub async fn create_menu(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    payload: Option<ApiJson<CreateMenu>>,
) -> Result<(StatusCode, Json<ApiResponse<MenuView>>), ApiError> {
    let request = payload.map(|ApiJson(p)| p).unwrap_or_default();
    let menu = state.menu_service().create_menu(account_id, request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(menu))))
}

/// GET /menu
pub async fn get_menu(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
) -> Result<Json<ApiResponse<MenuView>>, ApiError> {
    let menu = state.menu_service().get_menu(account_id).await?;
    Ok(Json(ApiResponse::success(menu)))
}

/// PUT /menu/theme
pub async fn update_theme(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    ApiJson(payload): ApiJson<ThemeUpdate>,
) -> Result<Json<ApiResponse<Theme>>, ApiError> {
    let theme = state
        .menu_service()
        .update_theme(account_id, payload)
        .await?;

    Ok(Json(ApiResponse::success(theme)))
}

/// POST /menu/regenerate-link
pub async fn regenerate_link(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
) -> Result<Json<ApiResponse<MenuView>>, ApiError> {
    let menu = state.menu_service().regenerate_link(account_id).await?;
    Ok(Json(ApiResponse::success(menu)))
}
