//! Unauthenticated menu endpoints used by the customer-facing page.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, header},
};
use std::sync::Arc;

use super::validation::is_plausible_slug;
use super::{ApiError, ApiJson, ApiResponse, AppState, QrCodeResponse};
use crate::services::{PublicMenu, Quote, QuoteRequest};

fn menu_not_found(slug: &str) -> ApiError {
    ApiError::not_found("Menu", slug)
}

/// GET /menu/{slug}
pub async fn get_public_menu(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PublicMenu>>, ApiError> {
    if !is_plausible_slug(&slug) {
        return Err(menu_not_found(&slug));
    }

    let menu = state.menu_service().public_menu(&slug).await?;
    Ok(Json(ApiResponse::success(menu)))
}

/// POST /menu/{slug}/quote
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ApiJson(payload): ApiJson<QuoteRequest>,
) -> Result<Json<ApiResponse<Quote>>, ApiError> {
    if !is_plausible_slug(&slug) {
        return Err(menu_not_found(&slug));
    }

    let quote = state.menu_service().quote(&slug, payload).await?;
    Ok(Json(ApiResponse::success(quote)))
}

/// GET /menu/qr/{slug}
/// The QR encodes `<public_base_url>/menu/<slug>`, or the request host when
/// no public base URL is configured.
pub async fn get_qr_code(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<QrCodeResponse>>, ApiError> {
    if !is_plausible_slug(&slug) {
        return Err(menu_not_found(&slug));
    }

    let configured = state.config().read().await.server.public_base_url.clone();
    let base_url = configured.unwrap_or_else(|| base_url_from_headers(&headers));

    let qr_code = state.menu_service().qr_code(&slug, &base_url).await?;
    Ok(Json(ApiResponse::success(QrCodeResponse { qr_code })))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn base_url_from_headers(headers: &HeaderMap) -> String {
    let host = header_str(headers, "x-forwarded-host")
        .or_else(|| header_str(headers, header::HOST.as_str()))
        .unwrap_or("localhost");
    let scheme = header_str(headers, "x-forwarded-proto").unwrap_or("http");

    format!("{scheme}://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_base_url_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:5000"));
        assert_eq!(base_url_from_headers(&headers), "http://internal:5000");

        headers.insert("x-forwarded-host", HeaderValue::from_static("menu.example"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(base_url_from_headers(&headers), "https://menu.example");

        assert_eq!(base_url_from_headers(&HeaderMap::new()), "http://localhost");
    }
}
