use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::models::ordering::OrderingError;
use crate::services::{AuthError, ItemError, MenuError, OrderError, UploadError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    PayloadTooLarge(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::EmailTaken | AuthError::InvalidResetToken => Self::validation(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::NotFound => Self::NotFound(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        match err {
            MenuError::AlreadyExists => Self::validation(err.to_string()),
            MenuError::Validation(msg) => Self::validation(msg),
            MenuError::NotFound | MenuError::AccountNotFound => Self::NotFound(err.to_string()),
            MenuError::Database(msg) => Self::DatabaseError(msg),
            MenuError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::MenuNotFound | ItemError::NotFound => Self::NotFound(err.to_string()),
            ItemError::Forbidden => Self::Forbidden(err.to_string()),
            ItemError::Validation(msg) => Self::validation(msg),
            ItemError::Database(msg) => Self::DatabaseError(msg),
            ItemError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::AddressRequired | OrderError::ItemsRequired => {
                Self::validation(err.to_string())
            }
            OrderError::Validation(msg) => Self::validation(msg),
            OrderError::Database(msg) => Self::DatabaseError(msg),
            OrderError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            UploadError::MissingFile | UploadError::NotAnImage | UploadError::Malformed(_) => {
                Self::validation(err.to_string())
            }
            UploadError::Storage(msg) => Self::internal(msg),
        }
    }
}

impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::validation(rejection.body_text())
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_statuses() {
        let cases = [
            (ApiError::from(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (ApiError::from(AuthError::EmailTaken), StatusCode::BAD_REQUEST),
            (ApiError::from(MenuError::AlreadyExists), StatusCode::BAD_REQUEST),
            (ApiError::from(MenuError::NotFound), StatusCode::NOT_FOUND),
            (ApiError::from(ItemError::Forbidden), StatusCode::FORBIDDEN),
            (ApiError::from(OrderError::AddressRequired), StatusCode::BAD_REQUEST),
            (
                ApiError::from(UploadError::TooLarge { max_bytes: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                ApiError::from(ItemError::Database("locked".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
