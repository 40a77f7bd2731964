//! Request authentication middleware.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use vocalink_identity::{find_user, verify_token, IdentityError, User};

use crate::AppState;

/// The authenticated user, stored in request extensions for handlers.
#[derive(Clone, Debug)]
pub struct AuthContext(pub User);

/// Middleware to authenticate requests via `Authorization: Bearer <token>`.
///
/// A missing, malformed, unverifiable, or expired token yields 401. A
/// token that verifies but whose identity row no longer exists yields
/// 404: the credential was real once, but its subject is gone.
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .clone();

    let user_id = verify_token(&state.jwt_secret, &token).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // User lookup is a blocking DB operation.
    let user = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        find_user(&conn, &user_id).map_err(|e| match e {
            IdentityError::UserNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        })
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)??;

    req.extensions_mut().insert(AuthContext(user));

    Ok(next.run(req).await)
}
