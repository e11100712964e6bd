//! JSON body extractor that answers rejections with the API error envelope.

use axum::{
    Json,
    extract::{FromRequest, OptionalFromRequest, Request},
};
use serde::de::DeserializeOwned;

use super::ApiError;

/// `axum::Json` for request bodies. A wrong content type, broken syntax or a
/// field of the wrong type becomes a 400 instead of axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// A request without a `Content-Type` header yields `None`.
impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
        Ok(value.map(|Json(v)| Self(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    fn json_request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_rejections_become_validation_errors() {
        for (content_type, body) in [
            (Some("application/json"), r#"{"name": 5}"#),
            (Some("application/json"), r#"{"name": "#),
            (Some("text/plain"), r#"{"name": "ok"}"#),
            (None, r#"{"name": "ok"}"#),
        ] {
            let result =
                <ApiJson<Payload> as FromRequest<()>>::from_request(json_request(content_type, body), &())
                    .await;
            assert!(
                matches!(result, Err(ApiError::ValidationError(_))),
                "{content_type:?} {body}"
            );
        }
    }

    #[tokio::test]
    async fn test_optional_body_may_be_absent() {
        let result =
            <ApiJson<Payload> as OptionalFromRequest<()>>::from_request(json_request(None, ""), &())
                .await;
        assert!(matches!(result, Ok(None)));

        let result = <ApiJson<Payload> as OptionalFromRequest<()>>::from_request(
            json_request(Some("application/json"), r#"{"name": 1}"#),
            &(),
        )
        .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }
}
