//! Registration, login, and current-user handlers.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vocalink_identity::{
    create_user, find_user_by_email, hash_password, issue_token, verify_password, IdentityError,
    User,
};

use crate::api::{run_blocking, ApiError};
use crate::middleware::AuthContext;
use crate::AppState;

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body shared by registration and login: the user shape with
/// the session token alongside.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

/// Handler for `POST /api/auth/register`.
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".to_string()));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("invalid email address".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".to_string()));
    }

    let jwt_secret = state.jwt_secret.clone();
    let user = run_blocking(move || {
        let password_hash = hash_password(&payload.password)?;
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        Ok(create_user(&conn, &payload.username, &payload.email, &password_hash)?)
    })
    .await?;

    let token = issue_token(&jwt_secret, &user.id)?;
    Ok(Json(AuthResponse { token, user }))
}

/// Handler for `POST /api/auth/login`.
///
/// The failure message never reveals whether the email or the password
/// was the wrong half of the pair.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    const BAD_CREDENTIALS: &str = "invalid email or password";

    let jwt_secret = state.jwt_secret.clone();
    let user = run_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;

        let stored = find_user_by_email(&conn, &payload.email).map_err(|e| match e {
            IdentityError::UserNotFound(_) => ApiError::Unauthorized(BAD_CREDENTIALS.to_string()),
            other => other.into(),
        })?;

        if !verify_password(&payload.password, &stored.password_hash) {
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
        Ok(stored.user)
    })
    .await?;

    let token = issue_token(&jwt_secret, &user.id)?;
    Ok(Json(AuthResponse { token, user }))
}

/// Handler for `GET /api/users/me`.
pub async fn me_handler(Extension(ctx): Extension<AuthContext>) -> Json<User> {
    Json(ctx.0)
}
