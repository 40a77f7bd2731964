//! Call session handlers.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use vocalink_calls::{
    create_call, end_call, join_call, list_calls, CallSession, CreateCallParams,
};
use vocalink_types::CallKind;

use crate::api::{run_blocking, ApiError};
use crate::middleware::AuthContext;
use crate::AppState;

/// Request body for `POST /api/calls`.
#[derive(Debug, Deserialize)]
pub struct CreateCallRequest {
    /// Invitee email; resolved to a user id at creation if it matches a
    /// registered account.
    #[serde(default)]
    pub receiver_email: Option<String>,
    #[serde(default)]
    pub call_type: CallKind,
    #[serde(default)]
    pub voice_settings: Option<Value>,
}

/// Handler for `POST /api/calls`.
pub async fn create_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateCallRequest>,
) -> Result<Json<CallSession>, ApiError> {
    let caller_id = ctx.0.id;
    let params = CreateCallParams {
        receiver_email: payload.receiver_email,
        call_type: payload.call_type,
        voice_settings: payload.voice_settings,
    };

    let call = run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(create_call(&conn, &caller_id, &params)?)
    })
    .await?;

    Ok(Json(call))
}

/// Handler for `GET /api/calls`.
pub async fn list_calls_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<CallSession>>, ApiError> {
    let user_id = ctx.0.id;
    let calls = run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(list_calls(&conn, &user_id)?)
    })
    .await?;

    Ok(Json(calls))
}

/// Handler for `PATCH /api/calls/{callId}/join`.
pub async fn join_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(call_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let requester_id = ctx.0.id;
    run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(join_call(&conn, &call_id, &requester_id)?)
    })
    .await?;

    Ok(Json(json!({ "status": "joined" })))
}

/// Handler for `PATCH /api/calls/{callId}/end`.
pub async fn end_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(call_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let requester_id = ctx.0.id;
    run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(end_call(&conn, &call_id, &requester_id)?)
    })
    .await?;

    Ok(Json(json!({ "status": "ended" })))
}
