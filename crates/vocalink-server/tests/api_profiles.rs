//! Voice profile creation and listing over the HTTP surface.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use vocalink_db::{create_pool, DbRuntimeSettings};
use vocalink_server::{app, AppState};
use vocalink_voice::{BlockingPool, VoiceOrchestrator};

fn test_app() -> Router {
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
        pool,
        jwt_secret: "test-secret".to_string(),
        voice: Arc::new(voice),
    };
    app(state)
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

async fn register(app: &Router, username: &str, email: &str) -> String {
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
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn create_profile_and_list() {
    let app = test_app();
    let token = register(&app, "alice", "alice@example.com").await;

    let (status, profile) = request_json(
        &app,
        "POST",
        "/api/voice-profiles",
        Some(&token),
        Some(json!({"name": "my voice", "voice_data": {"pitch": 1.2}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "my voice");
    assert_eq!(profile["training_status"], "untrained");
    assert_eq!(profile["voice_data"]["pitch"], 1.2);

    let (status, listed) = request_json(&app, "GET", "/api/voice-profiles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], profile["id"]);
}

#[tokio::test]
async fn new_profile_becomes_active() {
    let app = test_app();
    let token = register(&app, "alice", "alice@example.com").await;

    let (_, first) = request_json(
        &app,
        "POST",
        "/api/voice-profiles",
        Some(&token),
        Some(json!({"name": "first"})),
    )
    .await;
    let (_, second) = request_json(
        &app,
        "POST",
        "/api/voice-profiles",
        Some(&token),
        Some(json!({"name": "second"})),
    )
    .await;
    assert_ne!(first["id"], second["id"]);

    // Last created wins the active pointer.
    let (_, me) = request_json(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(me["voice_profile_id"], second["id"]);
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let app = test_app();
    let token = register(&app, "alice", "alice@example.com").await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/api/voice-profiles",
        Some(&token),
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profiles_are_scoped_to_their_owner() {
    let app = test_app();
    let alice = register(&app, "alice", "alice@example.com").await;
    let bob = register(&app, "bob", "bob@example.com").await;

    request_json(
        &app,
        "POST",
        "/api/voice-profiles",
        Some(&alice),
        Some(json!({"name": "alice voice"})),
    )
    .await;

    let (_, bob_profiles) = request_json(&app, "GET", "/api/voice-profiles", Some(&bob), None).await;
    assert!(bob_profiles.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn profile_routes_require_auth() {
    let app = test_app();

    let (status, _) = request_json(&app, "GET", "/api/voice-profiles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
