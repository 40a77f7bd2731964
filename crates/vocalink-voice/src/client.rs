//! Blocking HTTP client for the external speech service.
//!
//! Speaks an ElevenLabs-style API: a voice catalog, multi-file voice
//! cloning, text-to-speech, and speech-to-text. All methods perform
//! blocking I/O and must only be called from the worker pool, never from
//! an async context.

use reqwest::blocking::multipart;
use serde::Deserialize;
use std::time::Duration;
use vocalink_types::{SynthesisSettings, VoiceDescriptor};

use crate::config::SpeechConfig;
use crate::error::VoiceError;

/// One uploaded audio sample for a cloning request.
#[derive(Debug, Clone)]
pub struct AudioSample {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceDescriptor>,
}

#[derive(Debug, Deserialize)]
struct AddVoiceResponse {
    voice_id: String,
}

/// Blocking client for the speech service.
#[derive(Debug)]
pub struct SpeechClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    tts_model_id: String,
    stt_model_id: String,
}

impl SpeechClient {
    /// Builds a client from the given configuration.
    ///
    /// Must not be called from an async context: the blocking reqwest
    /// client owns a dedicated runtime thread.
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceError::External(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            tts_model_id: config.tts_model_id.clone(),
            stt_model_id: config.stt_model_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches the voice catalog.
    pub fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, VoiceError> {
        let response = self
            .http
            .get(self.url("/v1/voices"))
            .header("xi-api-key", &self.api_key)
            .send()
            .map_err(|e| VoiceError::External(e.to_string()))?;

        let response = check_status(response)?;
        let catalog: VoicesResponse = response
            .json()
            .map_err(|e| VoiceError::External(format!("malformed voice catalog: {e}")))?;
        Ok(catalog.voices)
    }

    /// Submits a multi-file cloning request and returns the new voice id.
    pub fn add_voice(
        &self,
        name: &str,
        description: &str,
        samples: Vec<AudioSample>,
    ) -> Result<String, VoiceError> {
        let mut form = multipart::Form::new()
            .text("name", name.to_string())
            .text("description", description.to_string());

        for sample in samples {
            let part = multipart::Part::bytes(sample.data)
                .file_name(sample.filename)
                .mime_str(&sample.content_type)
                .map_err(|e| VoiceError::External(format!("bad sample content type: {e}")))?;
            form = form.part("files", part);
        }

        let response = self
            .http
            .post(self.url("/v1/voices/add"))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| VoiceError::External(e.to_string()))?;

        let response = check_status(response)?;
        let added: AddVoiceResponse = response
            .json()
            .map_err(|e| VoiceError::External(format!("malformed clone response: {e}")))?;
        Ok(added.voice_id)
    }

    /// Synthesizes speech and returns the encoded audio bytes.
    pub fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &SynthesisSettings,
    ) -> Result<Vec<u8>, VoiceError> {
        let body = serde_json::json!({
            "text": text,
            "model_id": self.tts_model_id,
            "voice_settings": {
                "stability": settings.stability,
                "similarity_boost": settings.similarity_boost,
                "style": settings.style,
                "use_speaker_boost": settings.speaker_boost,
            },
        });

        let response = self
            .http
            .post(self.url(&format!("/v1/text-to-speech/{voice_id}")))
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| VoiceError::External(e.to_string()))?;

        let response = check_status(response)?;
        let audio = response
            .bytes()
            .map_err(|e| VoiceError::External(format!("failed to read audio stream: {e}")))?;
        Ok(audio.to_vec())
    }

    /// Transcribes raw audio bytes.
    ///
    /// A response without a recognizable `text` field degrades to a
    /// best-effort string of the body rather than failing, so partial
    /// results stay available.
    pub fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, VoiceError> {
        let part = multipart::Part::bytes(audio).file_name(filename.to_string());
        let form = multipart::Form::new()
            .text("model_id", self.stt_model_id.clone())
            .part("file", part);

        let response = self
            .http
            .post(self.url("/v1/speech-to-text"))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| VoiceError::External(e.to_string()))?;

        let response = check_status(response)?;
        let body = response
            .bytes()
            .map_err(|e| VoiceError::External(format!("failed to read transcript: {e}")))?;

        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(value) => match value.get("text").and_then(|t| t.as_str()) {
                Some(text) => Ok(text.to_string()),
                None => {
                    tracing::warn!("transcription response had no text field, degrading");
                    Ok(String::from_utf8_lossy(&body).into_owned())
                }
            },
            Err(_) => {
                tracing::warn!("transcription response was not JSON, degrading");
                Ok(String::from_utf8_lossy(&body).into_owned())
            }
        }
    }
}

/// Maps a non-success HTTP status to [`VoiceError::External`], forwarding
/// the response body for diagnostics.
fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, VoiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(VoiceError::External(format!(
        "speech service returned {status}: {body}"
    )))
}
