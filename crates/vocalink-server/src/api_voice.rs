//! Voice service handlers: catalog, cloning, synthesis, transcription.

use axum::{
    extract::{Extension, Multipart},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use vocalink_types::SynthesisSettings;
use vocalink_voice::{AudioSample, VoiceCloneResult};

use crate::api::ApiError;
use crate::middleware::AuthContext;
use crate::AppState;

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("malformed multipart body: {e}"))
}

/// Handler for `GET /api/voices/available`.
pub async fn available_voices_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(_ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let voices = state.voice.list_voices().await?;
    Ok(Json(json!({ "voices": voices })))
}

/// Handler for `POST /api/voices/clone`.
///
/// Multipart form: a `name` text field, an optional `description` text
/// field, and one or more `files` parts carrying audio samples.
pub async fn clone_voice_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Result<Json<VoiceCloneResult>, ApiError> {
    let mut name = None;
    let mut description = String::new();
    let mut samples = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("description") => description = field.text().await.map_err(multipart_error)?,
            Some("files") => {
                let filename = field
                    .file_name()
                    .unwrap_or("sample")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?.to_vec();
                samples.push(AudioSample {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing name field".to_string()))?;

    let result = state
        .voice
        .clone_voice(&ctx.0.id, name, description, samples)
        .await?;
    Ok(Json(result))
}

/// Request body for `POST /api/tts/generate`.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: String,
    /// Synthesis tuning knobs sit flat beside `text` and `voice_id`;
    /// omitted knobs fall back to defaults.
    #[serde(flatten)]
    pub settings: SynthesisSettings,
}

/// Handler for `POST /api/tts/generate`.
pub async fn generate_speech_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<TtsRequest>,
) -> Result<Json<Value>, ApiError> {
    let artifact = state
        .voice
        .synthesize(&ctx.0.id, payload.text, payload.voice_id, payload.settings)
        .await?;
    Ok(Json(json!({
        "audio_url": artifact.payload,
        "text": artifact.text,
        "voice_id": artifact.voice_id,
        "generation_id": artifact.id,
        "created_at": artifact.created_at,
    })))
}

/// Handler for `POST /api/stt/transcribe`.
///
/// Multipart form with a single `file` part carrying the audio to
/// transcribe.
pub async fn transcribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("audio").to_string();
            let data = field.bytes().await.map_err(multipart_error)?.to_vec();
            upload = Some((filename, data));
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;

    let artifact = state.voice.transcribe(&ctx.0.id, data, filename).await?;
    Ok(Json(json!({
        "transcribed_text": artifact.text,
        "filename": artifact.filename,
        "transcription_id": artifact.id,
        "created_at": artifact.created_at,
    })))
}
