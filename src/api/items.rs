//! Menu item endpoints. Every route is scoped to the caller's menu.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::auth::AuthAccount;
use super::validation::validate_item_id;
use super::{
    ApiError, ApiJson, ApiResponse, AppState, MessageResponse, MoveItemRequest, ReorderResponse,
};
use crate::models::ordering::{Direction, parse_reorder_payload};
use crate::services::{ItemInput, ItemUpdate, MenuItemView};

/// POST /menu/items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    ApiJson(payload): ApiJson<ItemInput>,
) -> Result<(StatusCode, Json<ApiResponse<MenuItemView>>), ApiError> {
    let item = state.item_service().create_item(account_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// GET /menu/items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
) -> Result<Json<ApiResponse<Vec<MenuItemView>>>, ApiError> {
    let items = state.item_service().list_items(account_id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// GET /menu/items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MenuItemView>>, ApiError> {
    let id = validate_item_id(id)?;
    let item = state.item_service().get_item(account_id, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// PUT /menu/items/{id}
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ItemUpdate>,
) -> Result<Json<ApiResponse<MenuItemView>>, ApiError> {
    let id = validate_item_id(id)?;
    let item = state
        .item_service()
        .update_item(account_id, id, payload)
        .await?;

    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /menu/items/{id}
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_item_id(id)?;
    state.item_service().delete_item(account_id, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Menu item removed",
    ))))
}

/// PUT /menu/items/reorder
/// Body: `{ "items": [{ "id": 1, "order": 0 }, ...] }`.
pub async fn reorder_items(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<ApiResponse<ReorderResponse>>, ApiError> {
    let entries = parse_reorder_payload(&payload)?;
    let updated = state.item_service().reorder(account_id, entries).await?;

    Ok(Json(ApiResponse::success(ReorderResponse { updated })))
}

/// POST /menu/items/{id}/move
/// Body: `{ "direction": "up" | "down" }`. Returns the re-sorted list.
pub async fn move_item(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<MoveItemRequest>,
) -> Result<Json<ApiResponse<Vec<MenuItemView>>>, ApiError> {
    let id = validate_item_id(id)?;
    let direction: Direction = payload.direction.parse()?;

    let items = state
        .item_service()
        .move_item(account_id, id, direction)
        .await?;

    Ok(Json(ApiResponse::success(items)))
}
