//! Voice profile handlers.

use axum::{extract::Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use vocalink_profiles::{create_profile, list_profiles, CreateProfileParams, VoiceProfile};
use vocalink_types::TrainingStatus;

use crate::api::{run_blocking, ApiError};
use crate::middleware::AuthContext;
use crate::AppState;

/// Request body for `POST /api/voice-profiles`.
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    /// Opaque voice-configuration payload; defaults to an empty object.
    #[serde(default)]
    pub voice_data: Option<serde_json::Value>,
}

/// Handler for `POST /api/voice-profiles`.
///
/// The new profile becomes the caller's active profile.
pub async fn create_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<Json<VoiceProfile>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("profile name must not be empty".to_string()));
    }

    let params = CreateProfileParams {
        user_id: ctx.0.id,
        name: payload.name,
        voice_data: payload.voice_data.unwrap_or_else(|| serde_json::json!({})),
        external_voice_id: None,
        sample_count: 0,
        training_status: TrainingStatus::Untrained,
    };

    let profile = run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(create_profile(&conn, &params)?)
    })
    .await?;

    Ok(Json(profile))
}

/// Handler for `GET /api/voice-profiles`.
pub async fn list_profiles_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<VoiceProfile>>, ApiError> {
    let user_id = ctx.0.id;
    let profiles = run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(list_profiles(&conn, &user_id)?)
    })
    .await?;

    Ok(Json(profiles))
}
