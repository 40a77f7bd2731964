//! Write-once voice artifact records.
//!
//! Every successful synthesis or transcription persists an artifact row
//! for audit and history. Rows are created by the orchestrator's worker
//! jobs and never mutated.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VoiceError;

/// What kind of external operation produced the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Synthesis,
    Transcription,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synthesis => "synthesis",
            Self::Transcription => "transcription",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "synthesis" => Some(Self::Synthesis),
            "transcription" => Some(Self::Transcription),
            _ => None,
        }
    }
}

/// A persisted result of a synthesis or transcription operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceArtifact {
    pub id: String,
    pub user_id: String,
    pub kind: ArtifactKind,
    /// The text that was synthesized, or the transcript produced.
    pub text: String,
    /// The voice used for synthesis; absent for transcriptions.
    pub voice_id: Option<String>,
    /// Inline `data:` audio payload (synthesis) or transcript text
    /// (transcription).
    pub payload: String,
    /// Original filename of the uploaded audio, for transcriptions.
    pub filename: Option<String>,
    /// Generation timestamp (RFC 3339).
    pub created_at: String,
}

impl VoiceArtifact {
    /// Builds a new artifact with a fresh id and current timestamp.
    pub fn new(
        user_id: &str,
        kind: ArtifactKind,
        text: String,
        voice_id: Option<String>,
        payload: String,
        filename: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            text,
            voice_id,
            payload,
            filename,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn map_row_to_artifact(row: &Row<'_>) -> rusqlite::Result<VoiceArtifact> {
    let kind_raw: String = row.get(2)?;
    let kind = ArtifactKind::from_str(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown artifact kind: {kind_raw}").into(),
        )
    })?;

    Ok(VoiceArtifact {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        text: row.get(3)?,
        voice_id: row.get(4)?,
        payload: row.get(5)?,
        filename: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Inserts an artifact row.
pub fn insert_artifact(conn: &Connection, artifact: &VoiceArtifact) -> Result<(), VoiceError> {
    conn.execute(
        "INSERT INTO voice_artifacts (
            id, user_id, kind, text, voice_id, payload, filename, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            artifact.id,
            artifact.user_id,
            artifact.kind.as_str(),
            artifact.text,
            artifact.voice_id,
            artifact.payload,
            artifact.filename,
            artifact.created_at,
        ],
    )?;
    Ok(())
}

/// Lists a user's artifacts, newest first.
pub fn list_artifacts(conn: &Connection, user_id: &str) -> Result<Vec<VoiceArtifact>, VoiceError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, text, voice_id, payload, filename, created_at
         FROM voice_artifacts WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([user_id], map_row_to_artifact)?;
    let mut artifacts = Vec::new();
    for row in rows {
        artifacts.push(row?);
    }
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        vocalink_db::run_migrations(&conn).expect("migrations should succeed");
        conn
    }

    fn seed_user(conn: &Connection) -> String {
        vocalink_identity::create_user(conn, "alice", "alice@example.com", "hash")
            .expect("user creation")
            .id
    }

    #[test]
    fn insert_and_list_round_trip() {
        let conn = test_conn();
        let user_id = seed_user(&conn);

        let artifact = VoiceArtifact::new(
            &user_id,
            ArtifactKind::Synthesis,
            "hello world".to_string(),
            Some("voice-1".to_string()),
            "data:audio/mpeg;base64,AAAA".to_string(),
            None,
        );
        insert_artifact(&conn, &artifact).unwrap();

        let listed = list_artifacts(&conn, &user_id).unwrap();
        assert_eq!(listed, vec![artifact]);
    }

    #[test]
    fn list_is_scoped_to_user() {
        let conn = test_conn();
        let alice = seed_user(&conn);
        let bob = vocalink_identity::create_user(&conn, "bob", "bob@example.com", "hash")
            .unwrap()
            .id;

        let artifact = VoiceArtifact::new(
            &alice,
            ArtifactKind::Transcription,
            "a transcript".to_string(),
            None,
            "a transcript".to_string(),
            Some("clip.wav".to_string()),
        );
        insert_artifact(&conn, &artifact).unwrap();

        assert_eq!(list_artifacts(&conn, &alice).unwrap().len(), 1);
        assert!(list_artifacts(&conn, &bob).unwrap().is_empty());
    }
}
