use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiJson, ApiResponse, AppState};
use crate::services::{OrderReceipt, OrderRequest};

/// POST /orders
/// Prices the posted cart and writes `order-<id>.pdf`, served from `/orders`.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<OrderRequest>,
) -> Result<Json<ApiResponse<OrderReceipt>>, ApiError> {
    let receipt = state.order_service().create_order(payload).await?;
    Ok(Json(ApiResponse::success(receipt)))
}
