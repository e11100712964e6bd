use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::debug;

use super::auth::AuthAccount;
use super::{ApiError, ApiResponse, AppState, UploadResponse};
use crate::services::UploadError;

const FIELD_NAME: &str = "image";

fn multipart_error(err: &MultipartError, max_bytes: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max_bytes }
    } else {
        UploadError::Malformed(err.body_text())
    }
}

/// POST /upload
/// Multipart form with an `image` field. Returns the public URL of the
/// stored file.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    AuthAccount(account_id): AuthAccount,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let uploads = state.upload_service();
    let max_bytes = uploads.max_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_bytes))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, max_bytes))?;

        let url = uploads
            .save_image(&bytes, content_type.as_deref(), file_name.as_deref())
            .await?;
        debug!(account_id, url = %url, "Image uploaded");

        return Ok(Json(ApiResponse::success(UploadResponse { url })));
    }

    Err(UploadError::MissingFile.into())
}
