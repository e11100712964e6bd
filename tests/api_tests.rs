mod common;

use axum::http::StatusCode;
use common::spawn_app;
use serde_json::json;

fn reset_token_from(text: &str) -> String {
    let start = text
        .find("/reset-password/")
        .expect("reset link missing from email")
        + "/reset-password/".len();
    text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/register",
            None,
            Some(json!({
                "name": "Ana",
                "email": "Ana@Example.com",
                "password": "secret123",
                "restaurant_name": "La Esquina",
                "phone": "1155550000",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["email"], "ana@example.com");
    assert_eq!(body["data"]["restaurant_name"], "La Esquina");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana");
    assert!(body["data"]["token"].is_string());

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!body["success"].as_bool().unwrap());

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = spawn_app().await;
    app.register("dup@example.com", "Uno").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/register",
            None,
            Some(json!({
                "name": "Otro",
                "email": "DUP@example.com",
                "password": "secret123",
                "restaurant_name": "Dos",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/register",
            None,
            Some(json!({
                "name": "Sin mail",
                "email": "not-an-email",
                "password": "secret123",
                "restaurant_name": "Tres",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/register",
            None,
            Some(json!({
                "name": "Corta",
                "email": "short@example.com",
                "password": "123",
                "restaurant_name": "Cuatro",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/register",
            None,
            Some(json!({ "email": "partial@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_registration_with_same_email() {
    let app = spawn_app().await;
    let payload = |restaurant: &str| {
        json!({
            "name": "Carla",
            "email": "twice@example.com",
            "password": "secret123",
            "restaurant_name": restaurant,
        })
    };

    let ((a, _), (b, body_b)) = tokio::join!(
        app.request("POST", "/api/admin/register", None, Some(payload("Uno"))),
        app.request("POST", "/api/admin/register", None, Some(payload("Dos"))),
    );
    let mut statuses = [a, b];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST], "{body_b}");

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "twice@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_wrongly_typed_fields_get_error_envelope() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": ["a@example.com"], "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = spawn_app().await;

    let (status, _) = app.request("GET", "/api/admin/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/admin/profile", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.register("me@example.com", "Mi Lugar").await;
    let (status, body) = app
        .request("GET", "/api/admin/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "me@example.com");
    assert_eq!(body["data"]["payment_methods"], json!([]));
}

#[tokio::test]
async fn test_update_profile_payment_settings() {
    let app = spawn_app().await;
    let token = app.register("pay@example.com", "Pagos").await;

    let (status, body) = app
        .request(
            "PUT",
            "/api/admin/profile",
            Some(&token),
            Some(json!({
                "whatsapp": "+54 9 11 4444-3333",
                "instagram": "@pagos",
                "payment_methods": ["Efectivo", "tarjeta", "efectivo"],
                "payment_method_percents": { "Tarjeta": "10" },
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["payment_methods"], json!(["efectivo", "tarjeta"]));
    assert_eq!(body["data"]["payment_method_percents"]["tarjeta"], 10.0);
    assert!(body["data"]["token"].is_string());

    let (status, _) = app
        .request(
            "PUT",
            "/api/admin/profile",
            Some(&token),
            Some(json!({ "payment_method_percents": { "tarjeta": 150 } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .request("GET", "/api/admin/profile", Some(&token), None)
        .await;
    assert_eq!(body["data"]["payment_method_percents"]["tarjeta"], 10.0);
}

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let app = spawn_app().await;
    app.register("reset@example.com", "Reset").await;

    let (status, unknown) = app
        .request(
            "POST",
            "/api/admin/forgot-password",
            None,
            Some(json!({ "email": "ghost@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.mailer.sent().await.is_empty());

    let (status, known) = app
        .request(
            "POST",
            "/api/admin/forgot-password",
            None,
            Some(json!({ "email": "reset@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, known);

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "reset@example.com");
    assert!(sent[0].text.contains("https://app.example.com/reset-password/"));
    let reset_token = reset_token_from(&sent[0].text);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/reset-password/not-the-token",
            None,
            Some(json!({ "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/admin/reset-password/{reset_token}");
    let (status, body) = app
        .request("POST", &uri, None, Some(json!({ "password": "brand-new-pass" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = app
        .request("POST", &uri, None, Some(json!({ "password": "another-pass" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "reset@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "reset@example.com", "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
