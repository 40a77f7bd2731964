//! Shared types, enums, and constants for the Vocalink platform.
//!
//! This crate provides the foundational types used across all Vocalink
//! crates: call lifecycle enums, voice profile training states, and the
//! synthesis settings payload. Record structs (users, profiles, sessions,
//! artifacts) live in the crates that own their persistence.
//!
//! No crate in the workspace depends on anything *except* `vocalink-types`
//! for cross-cutting type definitions. This keeps the dependency graph
//! clean and prevents circular dependencies.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a call session.
///
/// Transitions are monotonic: `Waiting -> Active -> Ended`. There is no
/// transition out of `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Initial state, set at creation.
    Waiting,
    /// At least one participant has joined.
    Active,
    /// Terminal state. An ended call is immutable.
    Ended,
}

impl CallStatus {
    /// Returns the stored string form of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }

    /// Parses a stored string back into a status.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "active" => Some(Self::Active),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

/// The kind of call being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// A call where the speaker's audio is replaced by a cloned voice.
    #[default]
    VoiceClone,
    /// A plain call with no voice processing.
    Regular,
}

impl CallKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VoiceClone => "voice_clone",
            Self::Regular => "regular",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "voice_clone" => Some(Self::VoiceClone),
            "regular" => Some(Self::Regular),
            _ => None,
        }
    }
}

/// Training state of a voice profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Profile created from a self-declared configuration, never trained.
    #[default]
    Untrained,
    /// A cloning attempt is in flight.
    Training,
    /// Cloning succeeded; the external voice id is usable.
    Ready,
    /// Cloning failed.
    Failed,
}

impl TrainingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Untrained => "untrained",
            Self::Training => "training",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "untrained" => Some(Self::Untrained),
            "training" => Some(Self::Training),
            "ready" => Some(Self::Ready),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

mod voice;
pub use voice::{SynthesisSettings, VoiceDescriptor};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_status_round_trip() {
        for status in [CallStatus::Waiting, CallStatus::Active, CallStatus::Ended] {
            assert_eq!(CallStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn call_status_invalid() {
        assert_eq!(CallStatus::from_str(""), None);
        assert_eq!(CallStatus::from_str("ENDED"), None);
        assert_eq!(CallStatus::from_str("done"), None);
    }

    #[test]
    fn call_kind_default_is_voice_clone() {
        assert_eq!(CallKind::default(), CallKind::VoiceClone);
        assert_eq!(CallKind::from_str("voice_clone"), Some(CallKind::VoiceClone));
        assert_eq!(CallKind::from_str("regular"), Some(CallKind::Regular));
    }

    #[test]
    fn training_status_round_trip() {
        for status in [
            TrainingStatus::Untrained,
            TrainingStatus::Training,
            TrainingStatus::Ready,
            TrainingStatus::Failed,
        ] {
            assert_eq!(TrainingStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn call_kind_serde_uses_snake_case() {
        let json = serde_json::to_string(&CallKind::VoiceClone).unwrap();
        assert_eq!(json, "\"voice_clone\"");
        let back: CallKind = serde_json::from_str("\"regular\"").unwrap();
        assert_eq!(back, CallKind::Regular);
    }
}
