//! Shared API error type and the public status endpoints.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use vocalink_calls::CallError;
use vocalink_identity::IdentityError;
use vocalink_profiles::ProfileError;
use vocalink_voice::VoiceError;

use crate::AppState;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("upstream error: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            // Duplicate registration is reported as a plain client error,
            // matching what API consumers already expect.
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailTaken(_) => ApiError::Conflict(err.to_string()),
            IdentityError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            IdentityError::InvalidToken | IdentityError::Expired => {
                ApiError::Unauthorized("invalid or expired token".to_string())
            }
            IdentityError::Database(_) | IdentityError::PasswordHash(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ProfileError::Identity(inner) => inner.into(),
            ProfileError::Database(_) | ProfileError::Json(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<CallError> for ApiError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CallError::Identity(inner) => inner.into(),
            CallError::Database(_) | CallError::Json(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Unavailable => {
                ApiError::ServiceUnavailable("voice service not configured".to_string())
            }
            VoiceError::InvalidInput(msg) => ApiError::BadRequest(msg),
            VoiceError::External(msg) => ApiError::BadGateway(msg),
            VoiceError::Profile(inner) => inner.into(),
            VoiceError::Dispatch(_)
            | VoiceError::Database(_)
            | VoiceError::Pool(_)
            | VoiceError::Json(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

/// Runs a blocking closure on the tokio blocking pool, flattening the
/// join error into an [`ApiError`].
pub(crate) async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))?
}

/// Handler for `GET /api/`.
pub async fn root_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Vocalink voice mediation API",
        "version": env!("CARGO_PKG_VERSION"),
        "realtime_available": state.voice.realtime_available(),
    }))
}

/// Handler for `GET /api/realtime/status`.
pub async fn realtime_status_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "available": state.voice.realtime_available(),
    }))
}

/// Handler for `GET /api/voice/status`.
pub async fn voice_status_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "available": state.voice.speech_available(),
    }))
}
