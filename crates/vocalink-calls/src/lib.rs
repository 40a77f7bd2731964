//! Call session registry for the Vocalink platform.
//!
//! Owns the call-session state machine (`waiting -> active -> ended`) and
//! the participant authorization rule: a requester may act on a session
//! only as its caller or its resolved receiver. Everyone else gets the
//! same not-found error as a nonexistent session id, so an unauthorized
//! probe cannot confirm that a session exists.
//!
//! Join and End are each a single guarded UPDATE. Two authorized
//! participants racing Join against End is last-write-wins on the status
//! column; the only fence is the terminal `ended` state, which no UPDATE
//! matches.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use vocalink_identity::lookup_user_id_by_email;
use vocalink_types::{CallKind, CallStatus};

/// Errors that can occur during call operations.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// The session is absent, already ended, or the requester is not a
    /// participant. Deliberately a single variant for all three.
    #[error("call not found: {0}")]
    NotFound(String),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Identity(#[from] vocalink_identity::IdentityError),
}

/// A call session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub id: String,
    pub caller_id: String,
    /// Resolved from the receiver email at creation; absent if unresolved.
    pub receiver_id: Option<String>,
    pub call_type: CallKind,
    pub status: CallStatus,
    /// Opaque room identifier used by the transport layer to correlate peers.
    pub room_id: String,
    /// Optional per-call voice-settings payload.
    pub voice_settings: Option<serde_json::Value>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Stamped once the session ends (RFC 3339).
    pub ended_at: Option<String>,
}

/// Parameters for creating a call.
#[derive(Debug, Clone, Default)]
pub struct CreateCallParams {
    pub receiver_email: Option<String>,
    pub call_type: CallKind,
    pub voice_settings: Option<serde_json::Value>,
}

fn map_row_to_call(row: &Row<'_>) -> rusqlite::Result<CallSession> {
    let call_type_raw: String = row.get(3)?;
    let call_type = CallKind::from_str(&call_type_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown call type: {call_type_raw}").into(),
        )
    })?;

    let status_raw: String = row.get(4)?;
    let status = CallStatus::from_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown call status: {status_raw}").into(),
        )
    })?;

    let settings_raw: Option<String> = row.get(6)?;
    let voice_settings = settings_raw
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CallSession {
        id: row.get(0)?,
        caller_id: row.get(1)?,
        receiver_id: row.get(2)?,
        call_type,
        status,
        room_id: row.get(5)?,
        voice_settings,
        created_at: row.get(7)?,
        ended_at: row.get(8)?,
    })
}

const CALL_COLUMNS: &str = "id, caller_id, receiver_id, call_type, status,
     room_id, voice_settings, created_at, ended_at";

/// Creates a call session in the `waiting` state with a fresh room id.
///
/// The receiver email, if given, is resolved to a user id; an unresolved
/// email is not an error — the session is created without a receiver and
/// the caller may invite through another channel.
pub fn create_call(
    conn: &Connection,
    caller_id: &str,
    params: &CreateCallParams,
) -> Result<CallSession, CallError> {
    let receiver_id = match params.receiver_email.as_deref() {
        Some(email) => lookup_user_id_by_email(conn, email)?,
        None => None,
    };

    let call = CallSession {
        id: Uuid::new_v4().to_string(),
        caller_id: caller_id.to_string(),
        receiver_id,
        call_type: params.call_type,
        status: CallStatus::Waiting,
        room_id: Uuid::new_v4().to_string(),
        voice_settings: params.voice_settings.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
        ended_at: None,
    };

    let settings_json = call
        .voice_settings
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO calls (
            id, caller_id, receiver_id, call_type, status,
            room_id, voice_settings, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            call.id,
            call.caller_id,
            call.receiver_id,
            call.call_type.as_str(),
            call.status.as_str(),
            call.room_id,
            settings_json,
            call.created_at,
        ],
    )?;

    Ok(call)
}

/// Retrieves a call by id.
pub fn get_call(conn: &Connection, call_id: &str) -> Result<CallSession, CallError> {
    conn.query_row(
        &format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ?1"),
        [call_id],
        map_row_to_call,
    )
    .optional()?
    .ok_or_else(|| CallError::NotFound(call_id.to_string()))
}

/// Marks a session active on behalf of a participant.
///
/// Idempotent with respect to state: re-joining an already-active session
/// succeeds without further effect. Joining an ended session, a session the
/// requester is not part of, or a nonexistent id all fail with the same
/// [`CallError::NotFound`].
pub fn join_call(conn: &Connection, call_id: &str, requester_id: &str) -> Result<(), CallError> {
    let changed = conn.execute(
        "UPDATE calls SET status = ?1
         WHERE id = ?2
           AND (caller_id = ?3 OR receiver_id = ?3)
           AND status != ?4",
        params![
            CallStatus::Active.as_str(),
            call_id,
            requester_id,
            CallStatus::Ended.as_str(),
        ],
    )?;

    if changed == 0 {
        return Err(CallError::NotFound(call_id.to_string()));
    }
    Ok(())
}

/// Ends a session on behalf of a participant, stamping the end time.
///
/// Ending is exactly-once observable: the first authorized call matches
/// the mutable row; any later call finds no matching row and fails with
/// [`CallError::NotFound`].
pub fn end_call(conn: &Connection, call_id: &str, requester_id: &str) -> Result<(), CallError> {
    let changed = conn.execute(
        "UPDATE calls SET status = ?1, ended_at = ?2
         WHERE id = ?3
           AND (caller_id = ?4 OR receiver_id = ?4)
           AND status != ?1",
        params![
            CallStatus::Ended.as_str(),
            chrono::Utc::now().to_rfc3339(),
            call_id,
            requester_id,
        ],
    )?;

    if changed == 0 {
        return Err(CallError::NotFound(call_id.to_string()));
    }
    Ok(())
}

/// Lists all sessions where the user is caller or receiver.
pub fn list_calls(conn: &Connection, user_id: &str) -> Result<Vec<CallSession>, CallError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CALL_COLUMNS} FROM calls
         WHERE caller_id = ?1 OR receiver_id = ?1
         ORDER BY created_at DESC"
    ))?;

    let rows = stmt.query_map([user_id], map_row_to_call)?;
    let mut calls = Vec::new();
    for row in rows {
        calls.push(row?);
    }
    Ok(calls)
}
