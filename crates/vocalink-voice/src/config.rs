//! Speech service configuration.

use serde::Deserialize;

/// Configuration for the external speech service.
///
/// The service is considered configured when an API key is present;
/// availability is decided once at startup from this and never re-read.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// API key for the speech service. Empty means not configured.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the speech service API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for text-to-speech requests.
    #[serde(default = "default_tts_model")]
    pub tts_model_id: String,

    /// Model used for speech-to-text requests.
    #[serde(default = "default_stt_model")]
    pub stt_model_id: String,

    /// Per-request timeout for external calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_tts_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_stt_model() -> String {
    "scribe_v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            tts_model_id: default_tts_model(),
            stt_model_id: default_stt_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SpeechConfig {
    /// Whether the service has enough configuration to be called.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
