use thiserror::Error;

/// Errors that can occur during voice orchestration.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The external speech service was not configured at startup.
    #[error("speech service not available")]
    Unavailable,

    /// Malformed or out-of-range request data, rejected before any
    /// external call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configured external call failed at runtime. The underlying
    /// message is forwarded for diagnostics.
    #[error("speech service error: {0}")]
    External(String),

    /// The worker pool could not accept or report back a dispatched call.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Profile(#[from] vocalink_profiles::ProfileError),
}
