//! Account endpoints driven through the full router.

mod common;

use axum::http::StatusCode;
use common::{FakeSource, SECRET, app, error_code};
use jsonwebtoken::{EncodingKey, Header, encode};
use papertok_core::models::auth::Claims;
use serde_json::json;

async fn register_alice(app: &common::TestApp) -> (i64, String) {
    let (status, json) = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": "alice", "email": "alice@example.com", "password": "Password1!"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    let id = json["data"]["user"]["id"].as_i64().unwrap();
    let token = json["data"]["token"].as_str().unwrap().to_string();
    (id, token)
}

fn expired_token(user_id: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id,
        username: "alice".into(),
        email: "alice@example.com".into(),
        iss: "papertok".into(),
        sub: user_id.to_string(),
        iat: now - 7200,
        exp: now - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn register_login_scenario() {
    let app = app(FakeSource::default());
    let (user_id, token) = register_alice(&app).await;
    assert!(!token.is_empty());

    let (status, json) = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": "alice2", "email": "alice@example.com", "password": "Password1!"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&json), "USER_EXISTS");
    assert_eq!(json["success"], false);

    let (status, json) = app
        .post_json(
            "/api/v1/auth/login",
            json!({"identifier": "alice@example.com", "password": "WrongPass"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json), "INVALID_CREDENTIALS");

    let (status, json) = app
        .post_json(
            "/api/v1/auth/login",
            json!({"identifier": "alice@example.com", "password": "Password1!"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["user"]["id"].as_i64(), Some(user_id));
    assert_eq!(json["data"]["user"]["username"], "alice");
    assert!(json["data"]["user"]["createdAt"].is_string());
    assert!(json["timestamp"].is_i64());
}

#[tokio::test]
async fn register_validation_failure() {
    let app = app(FakeSource::default());
    let (status, json) = app
        .post_json(
            "/api/v1/auth/register",
            json!({"username": "alice", "email": "not-an-email", "password": "Password1!"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json), "VALIDATION_FAILED");
    assert_eq!(json["error"]["message"], "邮箱格式不正确");
    assert!(app.users.is_empty().await);
}

#[tokio::test]
async fn malformed_body_is_validation_error() {
    let app = app(FakeSource::default());
    let (status, json) = app
        .post_json("/api/v1/auth/login", json!({"identifier": "alice"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json), "VALIDATION_ERROR");
    assert!(json["error"]["details"].is_string());
}

#[tokio::test]
async fn profile_requires_bearer_token() {
    let app = app(FakeSource::default());
    let (user_id, token) = register_alice(&app).await;

    let (status, json) = app.get("/api/v1/auth/profile").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json), "MISSING_TOKEN");

    let (status, json) = app.get_authed("/api/v1/auth/profile", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json), "INVALID_TOKEN_FORMAT");

    let (status, json) = app
        .get_authed("/api/v1/auth/profile", "Bearer not.a.jwt")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json), "INVALID_TOKEN");

    let (status, json) = app
        .get_authed("/api/v1/auth/profile", &format!("Bearer {token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"].as_i64(), Some(user_id));
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert!(json["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn non_bearer_schemes_are_a_format_error() {
    let app = app(FakeSource::default());
    let (_, token) = register_alice(&app).await;

    for header in [
        token.clone(),
        format!("bearer {token}"),
        format!("Token {token}"),
        "Basic YWxpY2U6c2VjcmV0".to_string(),
        "Bearer    ".to_string(),
    ] {
        let (status, json) = app.get_authed("/api/v1/auth/profile", &header).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
        assert_eq!(error_code(&json), "INVALID_TOKEN_FORMAT", "header {header:?}");
    }
}

#[tokio::test]
async fn expired_token_is_rejected_then_refreshed() {
    let app = app(FakeSource::default());
    let (user_id, _) = register_alice(&app).await;
    let expired = expired_token(user_id);

    let (status, json) = app
        .get_authed("/api/v1/auth/profile", &format!("Bearer {expired}"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json), "TOKEN_EXPIRED");

    let (status, json) = app
        .post_json("/api/v1/auth/refresh", json!({"token": expired}))
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["user"]["id"].as_i64(), Some(user_id));
    let fresh = json["data"]["token"].as_str().unwrap();

    let (status, _) = app
        .get_authed("/api/v1/auth/profile", &format!("Bearer {fresh}"))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_rejects_forged_token() {
    let app = app(FakeSource::default());
    let (user_id, _) = register_alice(&app).await;
    let forged = encode(
        &Header::default(),
        &Claims {
            user_id,
            username: "alice".into(),
            email: "alice@example.com".into(),
            iss: "papertok".into(),
            sub: user_id.to_string(),
            iat: 0,
            exp: 1,
        },
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let (status, json) = app
        .post_json("/api/v1/auth/refresh", json!({"token": forged}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json), "INVALID_TOKEN");
}

#[tokio::test]
async fn deleted_user_profile_is_not_found() {
    let app = app(FakeSource::default());
    let (user_id, token) = register_alice(&app).await;
    app.users.delete(user_id).await;

    let (status, json) = app
        .get_authed("/api/v1/auth/profile", &format!("Bearer {token}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&json), "USER_NOT_FOUND");
}
