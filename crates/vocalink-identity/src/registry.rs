//! User registry.
//!
//! Manages the `users` table. Every row is keyed by a caller-visible UUID,
//! and the email column carries a unique index — duplicate registration
//! surfaces as [`IdentityError::EmailTaken`].

use crate::IdentityError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered identity. The password hash is deliberately not part of
/// this struct so it can never leak through serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Last-created-wins pointer to the active voice profile.
    pub voice_profile_id: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// A user together with the stored password hash, for login flows only.
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

fn map_row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        voice_profile_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Creates a new user with a fresh UUID.
///
/// # Errors
///
/// Returns [`IdentityError::EmailTaken`] when the email is already
/// registered, regardless of username or password differences.
pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, IdentityError> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: email.to_string(),
        voice_profile_id: None,
        created_at: Utc::now().to_rfc3339(),
    };

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user.id, user.username, user.email, password_hash, user.created_at],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            IdentityError::EmailTaken(email.to_string())
        }
        other => IdentityError::Database(other),
    })?;

    Ok(user)
}

/// Retrieves a user by id.
pub fn find_user(conn: &Connection, user_id: &str) -> Result<User, IdentityError> {
    conn.query_row(
        "SELECT id, username, email, voice_profile_id, created_at
         FROM users WHERE id = ?1",
        [user_id],
        map_row_to_user,
    )
    .optional()?
    .ok_or_else(|| IdentityError::UserNotFound(user_id.to_string()))
}

/// Retrieves a user and their password hash by email, for login.
pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<UserWithPassword, IdentityError> {
    conn.query_row(
        "SELECT id, username, email, voice_profile_id, created_at, password_hash
         FROM users WHERE email = ?1",
        [email],
        |row| {
            Ok(UserWithPassword {
                user: map_row_to_user(row)?,
                password_hash: row.get(5)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
}

/// Resolves an email to a user id, returning `None` when unregistered.
///
/// Used by call creation, where an unresolved receiver is not an error.
pub fn lookup_user_id_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<String>, IdentityError> {
    Ok(conn
        .query_row("SELECT id FROM users WHERE email = ?1", [email], |row| {
            row.get(0)
        })
        .optional()?)
}

/// Points the user's active voice profile at `profile_id`.
///
/// Last write wins: every newly created profile overwrites the pointer.
pub fn set_active_profile(
    conn: &Connection,
    user_id: &str,
    profile_id: &str,
) -> Result<(), IdentityError> {
    let changed = conn.execute(
        "UPDATE users SET voice_profile_id = ?1 WHERE id = ?2",
        params![profile_id, user_id],
    )?;
    if changed == 0 {
        return Err(IdentityError::UserNotFound(user_id.to_string()));
    }
    Ok(())
}
