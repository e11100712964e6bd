//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use qrmenu::config::Config;
use qrmenu::services::RecordingMailer;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub root: PathBuf,
}

pub fn test_config(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", root.join("qrmenu.db").display());
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.server.frontend_url = "https://app.example.com".to_string();
    config.server.public_base_url = Some("https://menu.example.com".to_string());
    config.storage.uploads_path = root.join("uploads").display().to_string();
    config.storage.orders_path = root.join("orders").display().to_string();
    config
}

pub async fn spawn_app() -> TestApp {
    let root = std::env::temp_dir().join(format!("qrmenu-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("Failed to create test directory");

    let mailer = Arc::new(RecordingMailer::new());
    let state =
        qrmenu::api::create_app_state_with_mailer(test_config(&root), mailer.clone(), None)
            .await
            .expect("Failed to create app state");

    TestApp {
        router: qrmenu::api::router(state).await,
        mailer,
        root,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Registers an account and returns its session token.
    pub async fn register(&self, email: &str, restaurant: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/admin/register",
                None,
                Some(json!({
                    "name": "Owner",
                    "email": email,
                    "password": "secret123",
                    "restaurant_name": restaurant,
                    "phone": "+54 9 11 5555-0000",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Registers an account, creates its menu and returns `(token, slug)`.
    pub async fn register_with_menu(&self, email: &str, restaurant: &str) -> (String, String) {
        let token = self.register(email, restaurant).await;
        let (status, body) = self.request("POST", "/api/menu", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED, "create menu failed: {body}");

        let slug = body["data"]["slug"].as_str().unwrap().to_string();
        (token, slug)
    }

    pub async fn create_item(&self, token: &str, name: &str, price: f64) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/menu/items",
                Some(token),
                Some(json!({
                    "name": name,
                    "price": price,
                    "category": "Principales",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create item failed: {body}");

        body["data"]["id"].as_i64().unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
