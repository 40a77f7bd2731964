//! The voice orchestrator: validate, dispatch, persist, report.
//!
//! Every external operation follows the same contract: inputs are
//! validated before anything is dispatched, the blocking call runs on the
//! worker pool, and the outcome is persisted from inside the worker job —
//! so a dropped requester cannot lose a result that the external service
//! already produced.
//!
//! Availability is decided once at construction (a `None` client means
//! the speech service was not configured at startup) and re-checked by
//! every entry point, failing fast instead of attempting a call doomed to
//! fail.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use std::sync::Arc;
use vocalink_db::DbPool;
use vocalink_identity::set_active_profile;
use vocalink_profiles::{insert_profile, CreateProfileParams};
use vocalink_types::{SynthesisSettings, TrainingStatus, VoiceDescriptor};

use crate::artifact::{insert_artifact, ArtifactKind, VoiceArtifact};
use crate::client::{AudioSample, SpeechClient};
use crate::error::VoiceError;
use crate::pool::BlockingPool;

/// Result of a successful voice-cloning operation.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceCloneResult {
    /// The externally assigned voice id.
    pub voice_id: String,
    /// The id of the profile created for the cloned voice.
    pub profile_id: String,
    pub name: String,
    pub status: TrainingStatus,
    pub message: String,
}

/// Orchestrates external speech-service calls.
pub struct VoiceOrchestrator {
    client: Option<Arc<SpeechClient>>,
    realtime_available: bool,
    db: DbPool,
    workers: BlockingPool,
}

impl VoiceOrchestrator {
    /// Builds an orchestrator. `client` is `None` when the speech service
    /// was not configured; `realtime_available` reflects whether the
    /// realtime integration initialized at startup.
    pub fn new(
        db: DbPool,
        client: Option<SpeechClient>,
        realtime_available: bool,
        workers: BlockingPool,
    ) -> Self {
        Self {
            client: client.map(Arc::new),
            realtime_available,
            db,
            workers,
        }
    }

    /// Whether the speech service is configured.
    pub fn speech_available(&self) -> bool {
        self.client.is_some()
    }

    /// Whether the realtime integration is available.
    pub fn realtime_available(&self) -> bool {
        self.realtime_available
    }

    fn client(&self) -> Result<Arc<SpeechClient>, VoiceError> {
        self.client.clone().ok_or(VoiceError::Unavailable)
    }

    /// Forwards the external voice catalog.
    pub async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, VoiceError> {
        let client = self.client()?;
        self.workers.run(move || client.list_voices()).await?
    }

    /// Clones a voice from uploaded audio samples.
    ///
    /// On success a `ready` profile bound to the external voice id is
    /// created and set as the user's active profile. On an external
    /// failure nothing is persisted. A failure of the secondary
    /// active-pointer write is logged but does not fail the operation —
    /// the profile itself is already durable and discoverable by
    /// re-listing.
    pub async fn clone_voice(
        &self,
        user_id: &str,
        name: String,
        description: String,
        samples: Vec<AudioSample>,
    ) -> Result<VoiceCloneResult, VoiceError> {
        if samples.is_empty() {
            return Err(VoiceError::InvalidInput(
                "at least one audio sample is required".to_string(),
            ));
        }
        for sample in &samples {
            if !sample.content_type.starts_with("audio/") {
                return Err(VoiceError::InvalidInput(format!(
                    "file '{}' is not audio (content type: {})",
                    sample.filename, sample.content_type
                )));
            }
        }

        let client = self.client()?;
        let db = self.db.clone();
        let user_id = user_id.to_string();
        let sample_count = samples.len() as u32;

        self.workers
            .run(move || {
                let voice_id = client.add_voice(&name, &description, samples)?;

                let conn = db.get()?;
                let profile = insert_profile(
                    &conn,
                    &CreateProfileParams {
                        user_id: user_id.clone(),
                        name: name.clone(),
                        voice_data: serde_json::json!({ "provider_voice_id": voice_id }),
                        external_voice_id: Some(voice_id.clone()),
                        sample_count,
                        training_status: TrainingStatus::Ready,
                    },
                )?;

                if let Err(e) = set_active_profile(&conn, &user_id, &profile.id) {
                    tracing::warn!(
                        user_id,
                        profile_id = profile.id,
                        error = %e,
                        "cloned profile created but active-pointer update failed"
                    );
                }

                Ok(VoiceCloneResult {
                    voice_id,
                    profile_id: profile.id,
                    name,
                    status: TrainingStatus::Ready,
                    message: "voice cloned successfully".to_string(),
                })
            })
            .await?
    }

    /// Synthesizes speech from text and persists the result.
    ///
    /// The tuning knobs are bounded to `[0.0, 1.0]`; out-of-range values
    /// are rejected before any external call is attempted. Never mutates
    /// session or profile state.
    pub async fn synthesize(
        &self,
        user_id: &str,
        text: String,
        voice_id: String,
        settings: SynthesisSettings,
    ) -> Result<VoiceArtifact, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::InvalidInput("text must not be empty".to_string()));
        }
        if let Some(field) = settings.out_of_range_field() {
            return Err(VoiceError::InvalidInput(format!(
                "{field} must be between 0.0 and 1.0"
            )));
        }

        let client = self.client()?;
        let db = self.db.clone();
        let user_id = user_id.to_string();

        self.workers
            .run(move || {
                let audio = client.synthesize(&text, &voice_id, &settings)?;
                let payload = format!("data:audio/mpeg;base64,{}", BASE64.encode(&audio));

                let artifact = VoiceArtifact::new(
                    &user_id,
                    ArtifactKind::Synthesis,
                    text,
                    Some(voice_id),
                    payload,
                    None,
                );
                let conn = db.get()?;
                insert_artifact(&conn, &artifact)?;
                Ok(artifact)
            })
            .await?
    }

    /// Transcribes uploaded audio and persists the result.
    ///
    /// A degraded-content response from the service still produces and
    /// persists an artifact; the transcript is then a best-effort string.
    pub async fn transcribe(
        &self,
        user_id: &str,
        audio: Vec<u8>,
        filename: String,
    ) -> Result<VoiceArtifact, VoiceError> {
        let client = self.client()?;
        let db = self.db.clone();
        let user_id = user_id.to_string();

        self.workers
            .run(move || {
                let text = client.transcribe(audio, &filename)?;

                let artifact = VoiceArtifact::new(
                    &user_id,
                    ArtifactKind::Transcription,
                    text.clone(),
                    None,
                    text,
                    Some(filename),
                );
                let conn = db.get()?;
                insert_artifact(&conn, &artifact)?;
                Ok(artifact)
            })
            .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocalink_db::{create_pool, DbRuntimeSettings};

    /// A single-connection pool keeps every `:memory:` access on the same
    /// underlying database.
    fn test_db() -> DbPool {
        let settings = DbRuntimeSettings {
            pool_max_size: 1,
            ..Default::default()
        };
        let db = create_pool(":memory:", settings).expect("pool creation");
        let conn = db.get().expect("connection");
        vocalink_db::run_migrations(&conn).expect("migrations");
        drop(conn);
        db
    }

    fn offline_orchestrator(db: DbPool) -> VoiceOrchestrator {
        VoiceOrchestrator::new(db, None, false, BlockingPool::new(2))
    }

    fn seed_user(db: &DbPool) -> String {
        let conn = db.get().expect("connection");
        vocalink_identity::create_user(&conn, "alice", "alice@example.com", "hash")
            .expect("user creation")
            .id
    }

    fn audio_sample(filename: &str, content_type: &str) -> AudioSample {
        AudioSample {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data: vec![0u8; 16],
        }
    }

    #[tokio::test]
    async fn availability_flags_are_injected() {
        let orchestrator = offline_orchestrator(test_db());
        assert!(!orchestrator.speech_available());
        assert!(!orchestrator.realtime_available());

        let orchestrator = VoiceOrchestrator::new(test_db(), None, true, BlockingPool::new(1));
        assert!(orchestrator.realtime_available());
    }

    #[tokio::test]
    async fn list_voices_unavailable_without_client() {
        let orchestrator = offline_orchestrator(test_db());
        let err = orchestrator.list_voices().await.unwrap_err();
        assert!(matches!(err, VoiceError::Unavailable));
    }

    #[tokio::test]
    async fn out_of_range_settings_rejected_before_dispatch() {
        let orchestrator = offline_orchestrator(test_db());
        let settings = SynthesisSettings {
            stability: 1.5,
            ..Default::default()
        };

        // InvalidInput, not Unavailable: validation precedes everything.
        let err = orchestrator
            .synthesize("user-1", "hello".to_string(), "voice-1".to_string(), settings)
            .await
            .unwrap_err();
        match err {
            VoiceError::InvalidInput(msg) => assert!(msg.contains("stability")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_text_rejected() {
        let orchestrator = offline_orchestrator(test_db());
        let err = orchestrator
            .synthesize(
                "user-1",
                "   ".to_string(),
                "voice-1".to_string(),
                SynthesisSettings::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn valid_synthesis_without_client_is_unavailable() {
        let orchestrator = offline_orchestrator(test_db());
        let err = orchestrator
            .synthesize(
                "user-1",
                "hello".to_string(),
                "voice-1".to_string(),
                SynthesisSettings::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::Unavailable));
    }

    #[tokio::test]
    async fn non_audio_sample_fails_whole_clone_request() {
        let db = test_db();
        let user_id = seed_user(&db);
        let orchestrator = offline_orchestrator(db.clone());

        let err = orchestrator
            .clone_voice(
                &user_id,
                "my clone".to_string(),
                String::new(),
                vec![
                    audio_sample("one.wav", "audio/wav"),
                    audio_sample("notes.txt", "text/plain"),
                    audio_sample("two.wav", "audio/wav"),
                ],
            )
            .await
            .unwrap_err();

        match err {
            VoiceError::InvalidInput(msg) => {
                assert!(msg.contains("notes.txt"), "must name the offending file")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        // Zero profiles created.
        let conn = db.get().unwrap();
        assert!(vocalink_profiles::list_profiles(&conn, &user_id)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn empty_sample_list_rejected() {
        let orchestrator = offline_orchestrator(test_db());
        let err = orchestrator
            .clone_voice("user-1", "clone".to_string(), String::new(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn valid_clone_without_client_is_unavailable_and_persists_nothing() {
        let db = test_db();
        let user_id = seed_user(&db);
        let orchestrator = offline_orchestrator(db.clone());

        let err = orchestrator
            .clone_voice(
                &user_id,
                "clone".to_string(),
                String::new(),
                vec![audio_sample("one.wav", "audio/wav")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::Unavailable));

        let conn = db.get().unwrap();
        assert!(vocalink_profiles::list_profiles(&conn, &user_id)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn transcribe_without_client_is_unavailable() {
        let orchestrator = offline_orchestrator(test_db());
        let err = orchestrator
            .transcribe("user-1", vec![1, 2, 3], "clip.wav".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::Unavailable));
    }
}
