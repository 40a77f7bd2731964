//! Voice catalog and synthesis parameter types.

use serde::{Deserialize, Serialize};

/// An entry in the external speech service's voice catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// The service-assigned voice identifier.
    pub voice_id: String,
    /// Human-readable voice name.
    pub name: String,
    /// Category reported by the service (e.g. "premade", "cloned").
    #[serde(default)]
    pub category: Option<String>,
    /// Optional description of the voice.
    #[serde(default)]
    pub description: Option<String>,
}

/// Tuning knobs for a synthesis request.
///
/// `stability`, `similarity_boost`, and `style` are bounded to `[0.0, 1.0]`;
/// the bound is enforced by the orchestrator before any external call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSettings {
    #[serde(default = "default_stability")]
    pub stability: f64,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f64,
    #[serde(default)]
    pub style: f64,
    #[serde(default = "default_speaker_boost")]
    pub speaker_boost: bool,
}

fn default_stability() -> f64 {
    0.5
}

fn default_similarity_boost() -> f64 {
    0.75
}

fn default_speaker_boost() -> bool {
    true
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            style: 0.0,
            speaker_boost: default_speaker_boost(),
        }
    }
}

impl SynthesisSettings {
    /// Returns the name of the first out-of-range field, if any.
    pub fn out_of_range_field(&self) -> Option<&'static str> {
        if !(0.0..=1.0).contains(&self.stability) {
            Some("stability")
        } else if !(0.0..=1.0).contains(&self.similarity_boost) {
            Some("similarity_boost")
        } else if !(0.0..=1.0).contains(&self.style) {
            Some("style")
        } else {
            None
        }
    }
}
