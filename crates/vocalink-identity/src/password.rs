//! One-way password hashing.
//!
//! Uses Argon2id with a random per-password salt. Verification compares
//! against the stored PHC-format hash and never logs or returns the
//! plaintext.

use crate::IdentityError;
use argon2::{Argon2, PasswordVerifier};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, SaltString};

/// Hashes a plaintext password into a PHC-format string.
pub fn hash_password(plain: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))
}

/// Verifies a plaintext password against a stored hash.
///
/// A malformed stored hash verifies as `false` rather than erroring; a
/// corrupt row reads as a failed login.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}
