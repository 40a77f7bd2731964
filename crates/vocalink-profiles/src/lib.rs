//! Voice profile store for the Vocalink platform.
//!
//! A voice profile is either a self-declared synthesis configuration or a
//! reference to an externally cloned voice. Multiple profiles per user may
//! coexist; the "currently active" pointer lives on the user row
//! (last-created-wins) and is updated atomically with each creation.
//! Profiles are never hard-deleted by the core.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use vocalink_identity::set_active_profile;
use vocalink_types::TrainingStatus;

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Identity(#[from] vocalink_identity::IdentityError),
}

/// A voice profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub id: String,
    /// Owning user id.
    pub user_id: String,
    /// Display name; no uniqueness constraint.
    pub name: String,
    /// Opaque voice-configuration payload.
    pub voice_data: serde_json::Value,
    /// Voice id assigned by the external cloning service, if any.
    pub external_voice_id: Option<String>,
    /// Number of audio samples the profile was built from.
    pub sample_count: u32,
    pub training_status: TrainingStatus,
    pub is_active: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// Parameters for creating a new profile.
#[derive(Debug, Clone)]
pub struct CreateProfileParams {
    pub user_id: String,
    pub name: String,
    pub voice_data: serde_json::Value,
    pub external_voice_id: Option<String>,
    pub sample_count: u32,
    pub training_status: TrainingStatus,
}

fn map_row_to_profile(row: &Row<'_>) -> rusqlite::Result<VoiceProfile> {
    let voice_data_raw: String = row.get(3)?;
    let voice_data = serde_json::from_str(&voice_data_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let status_raw: String = row.get(6)?;
    let training_status = TrainingStatus::from_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown training status: {status_raw}").into(),
        )
    })?;

    Ok(VoiceProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        voice_data,
        external_voice_id: row.get(4)?,
        sample_count: row.get(5)?,
        training_status,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const PROFILE_COLUMNS: &str = "id, user_id, name, voice_data, external_voice_id,
     sample_count, training_status, is_active, created_at";

/// Creates a profile and points the owner's active-profile pointer at it.
///
/// The insert and the pointer update are two separate writes, not a
/// cross-entity transaction; a crash between them leaves the profile
/// created but not yet active, which is recoverable by re-listing.
pub fn create_profile(
    conn: &Connection,
    params: &CreateProfileParams,
) -> Result<VoiceProfile, ProfileError> {
    let profile = insert_profile(conn, params)?;
    set_active_profile(conn, &params.user_id, &profile.id)?;
    Ok(profile)
}

/// Inserts a profile row without touching the owner's active pointer.
///
/// The cloning flow uses this as the primary write and performs the
/// pointer update separately, so a failed pointer update cannot undo an
/// already-durable clone result.
pub fn insert_profile(
    conn: &Connection,
    params: &CreateProfileParams,
) -> Result<VoiceProfile, ProfileError> {
    let profile = VoiceProfile {
        id: Uuid::new_v4().to_string(),
        user_id: params.user_id.clone(),
        name: params.name.clone(),
        voice_data: params.voice_data.clone(),
        external_voice_id: params.external_voice_id.clone(),
        sample_count: params.sample_count,
        training_status: params.training_status,
        is_active: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    conn.execute(
        "INSERT INTO voice_profiles (
            id, user_id, name, voice_data, external_voice_id,
            sample_count, training_status, is_active, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            profile.id,
            profile.user_id,
            profile.name,
            serde_json::to_string(&profile.voice_data)?,
            profile.external_voice_id,
            profile.sample_count,
            profile.training_status.as_str(),
            profile.is_active,
            profile.created_at,
        ],
    )?;

    Ok(profile)
}

/// Retrieves a profile by id.
pub fn get_profile(conn: &Connection, profile_id: &str) -> Result<VoiceProfile, ProfileError> {
    use rusqlite::OptionalExtension;

    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM voice_profiles WHERE id = ?1"),
        [profile_id],
        map_row_to_profile,
    )
    .optional()?
    .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))
}

/// Lists all profiles owned by a user.
pub fn list_profiles(conn: &Connection, user_id: &str) -> Result<Vec<VoiceProfile>, ProfileError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROFILE_COLUMNS} FROM voice_profiles WHERE user_id = ?1"
    ))?;

    let rows = stmt.query_map([user_id], map_row_to_profile)?;
    let mut profiles = Vec::new();
    for row in rows {
        profiles.push(row?);
    }
    Ok(profiles)
}

/// Records the outcome of a cloning attempt on a profile.
///
/// A missing profile is logged and tolerated: cloning results must never
/// crash the calling flow.
pub fn mark_training_result(
    conn: &Connection,
    profile_id: &str,
    status: TrainingStatus,
    external_voice_id: Option<&str>,
) -> Result<(), ProfileError> {
    let changed = conn.execute(
        "UPDATE voice_profiles SET
            training_status = ?1,
            external_voice_id = COALESCE(?2, external_voice_id)
        WHERE id = ?3",
        params![status.as_str(), external_voice_id, profile_id],
    )?;

    if changed == 0 {
        tracing::warn!(
            profile_id,
            status = status.as_str(),
            "training result for a profile that no longer exists, dropping"
        );
    }
    Ok(())
}
