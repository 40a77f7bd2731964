//! Identity registry and credential service for the Vocalink platform.
//!
//! Manages the `users` table (registration, lookup, the active voice
//! profile pointer) and issues/verifies the signed session tokens that
//! gate every other operation. Password storage is one-way (Argon2id);
//! the stored hash is never serialized to a caller.

mod password;
mod registry;
mod token;

pub use password::{hash_password, verify_password};
pub use registry::{
    create_user, find_user, find_user_by_email, lookup_user_id_by_email, set_active_profile,
    User, UserWithPassword,
};
pub use token::{issue_token, verify_token, TokenClaims, TOKEN_TTL_HOURS};

use thiserror::Error;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The email is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// No identity matches the given id or email.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The token signature did not verify or required claims are missing.
    #[error("invalid token")]
    InvalidToken,

    /// The token is past its expiry claim.
    #[error("token expired")]
    Expired,

    /// Password hashing or verification failed internally.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}
