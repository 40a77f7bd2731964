//! Vocalink server library logic.

pub mod api;
pub mod api_auth;
pub mod api_calls;
pub mod api_profiles;
pub mod api_voice;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vocalink_db::DbPool;
use vocalink_voice::VoiceOrchestrator;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Voice service orchestrator.
    pub voice: Arc<VoiceOrchestrator>,
}

/// Maximum request body size (2 MiB). Protects against OOM from oversized payloads.
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Audio upload routes get a larger ceiling (50 MiB).
const MAX_UPLOAD_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/users/me", get(api_auth::me_handler))
        .route(
            "/api/voice-profiles",
            post(api_profiles::create_profile_handler).get(api_profiles::list_profiles_handler),
        )
        .route(
            "/api/calls",
            post(api_calls::create_call_handler).get(api_calls::list_calls_handler),
        )
        .route("/api/calls/{callId}/join", patch(api_calls::join_call_handler))
        .route("/api/calls/{callId}/end", patch(api_calls::end_call_handler))
        .route(
            "/api/voices/available",
            get(api_voice::available_voices_handler),
        )
        .route("/api/tts/generate", post(api_voice::generate_speech_handler))
        .layer(axum::middleware::from_fn(middleware::auth_middleware));

    // Audio upload routes need a larger body limit than the default.
    let upload_routes = Router::new()
        .route("/api/voices/clone", post(api_voice::clone_voice_handler))
        .route("/api/stt/transcribe", post(api_voice::transcribe_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::auth_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/api/", get(api::root_handler))
        .route("/api/auth/register", post(api_auth::register_handler))
        .route("/api/auth/login", post(api_auth::login_handler))
        .route(
            "/api/realtime/status",
            get(api::realtime_status_handler),
        )
        .route("/api/voice/status", get(api::voice_status_handler))
        .merge(protected_routes)
        .merge(upload_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
