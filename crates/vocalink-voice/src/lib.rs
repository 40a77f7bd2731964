//! Voice-service orchestration for the Vocalink platform.
//!
//! Wraps the external speech service's blocking HTTP operations (voice
//! cloning, text-to-speech, speech-to-text) behind an asynchronous
//! façade: validate the input, dispatch the call onto a fixed-size
//! worker thread pool, persist the outcome, and report back to the
//! requester. Slow external calls never stall sibling requests; global
//! external-call throughput is capped by the worker count.

pub mod artifact;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pool;

pub use artifact::{insert_artifact, list_artifacts, ArtifactKind, VoiceArtifact};
pub use client::{AudioSample, SpeechClient};
pub use config::SpeechConfig;
pub use error::VoiceError;
pub use orchestrator::{VoiceCloneResult, VoiceOrchestrator};
pub use pool::BlockingPool;
