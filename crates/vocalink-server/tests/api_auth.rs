//! Registration, login, and token-gating behavior over the HTTP surface.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use vocalink_db::{create_pool, DbPool, DbRuntimeSettings};
use vocalink_server::{app, AppState};
use vocalink_voice::{BlockingPool, VoiceOrchestrator};

fn test_app() -> (Router, DbPool) {
    // A single pooled connection keeps every access on the same
    // in-memory database.
    let pool = create_pool(
        ":memory:",
        DbRuntimeSettings {
            pool_max_size: 1,
            ..Default::default()
        },
    )
    .expect("pool creation");
    {
        let conn = pool.get().expect("connection");
        vocalink_db::run_migrations(&conn).expect("migrations");
    }

    let voice = VoiceOrchestrator::new(pool.clone(), None, false, BlockingPool::new(1));
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: "test-secret".to_string(),
        voice: Arc::new(voice),
    };
    (app(state), pool)
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, username: &str, email: &str) -> (String, Value) {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "password": "hunter2secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let token = body["token"].as_str().expect("token").to_string();
    (token, body)
}

#[tokio::test]
async fn register_returns_token_and_user() {
    let (app, _pool) = test_app();

    let (token, body) = register(&app, "alice", "alice@example.com").await;
    assert!(!token.is_empty());
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].as_str().is_some());
    // The stored credential must never appear in any serialized shape.
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (app, _pool) = test_app();
    register(&app, "alice", "alice@example.com").await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "other",
            "email": "alice@example.com",
            "password": "differentpass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn register_validates_input() {
    let (app, _pool) = test_app();

    for payload in [
        json!({"username": "", "email": "a@b.com", "password": "pw"}),
        json!({"username": "alice", "email": "not-an-email", "password": "pw"}),
        json!({"username": "alice", "email": "a@b.com", "password": ""}),
    ] {
        let (status, _) =
            request_json(&app, "POST", "/api/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn login_round_trip() {
    let (app, _pool) = test_app();
    register(&app, "alice", "alice@example.com").await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "hunter2secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _pool) = test_app();
    register(&app, "alice", "alice@example.com").await;

    let (wrong_pw_status, wrong_pw_body) = request_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong"})),
    )
    .await;
    let (no_user_status, no_user_body) = request_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": "hunter2secret"})),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user_status, StatusCode::UNAUTHORIZED);
    // Same message either way: the response must not reveal which half
    // of the credential pair was wrong.
    assert_eq!(wrong_pw_body["error"], no_user_body["error"]);
}

#[tokio::test]
async fn me_requires_a_token() {
    let (app, _pool) = test_app();

    let (status, _) = request_json(&app, "GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_current_user() {
    let (app, _pool) = test_app();
    let (token, user) = register(&app, "alice", "alice@example.com").await;

    let (status, body) = request_json(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user["id"]);
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let (app, _pool) = test_app();
    let (token, _) = register(&app, "alice", "alice@example.com").await;

    let tampered = format!("{token}x");
    let (status, _) = request_json(&app, "GET", "/api/users/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_for_deleted_user_is_not_found() {
    let (app, pool) = test_app();
    let (token, user) = register(&app, "alice", "alice@example.com").await;

    {
        let conn = pool.get().unwrap();
        conn.execute(
            "DELETE FROM users WHERE id = ?1",
            [user["id"].as_str().unwrap()],
        )
        .unwrap();
    }

    let (status, _) = request_json(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
