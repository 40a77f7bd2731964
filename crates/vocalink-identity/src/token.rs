//! Signed session tokens.
//!
//! Tokens are HS256 JWTs binding a user id (`sub`) to an absolute expiry.
//! Issuing is a pure function of the input and the process-wide signing
//! secret; verification does not consult the database — confirming the
//! identity still exists is the caller's responsibility.

use crate::IdentityError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Fixed validity window for issued tokens.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user id (standard JWT `sub` claim).
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Issues a signed token for the given user id, valid for
/// [`TOKEN_TTL_HOURS`] from now.
pub fn issue_token(secret: &str, user_id: &str) -> Result<String, IdentityError> {
    issue_token_with_ttl(secret, user_id, TOKEN_TTL_HOURS * 3600)
}

/// Issues a token with an explicit TTL in seconds. Negative TTLs produce
/// already-expired tokens, which the expiry tests rely on.
pub fn issue_token_with_ttl(
    secret: &str,
    user_id: &str,
    ttl_seconds: i64,
) -> Result<String, IdentityError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        exp: now + ttl_seconds,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| IdentityError::InvalidToken)
}

/// Verifies a token and returns the embedded user id.
///
/// # Errors
///
/// Returns [`IdentityError::Expired`] when the token is past its expiry
/// claim, and [`IdentityError::InvalidToken`] for every other failure
/// (bad signature, malformed token, missing claims). The two cases are
/// distinguished so the server can log them separately, but both map to
/// 401 at the HTTP boundary.
pub fn verify_token(secret: &str, token: &str) -> Result<String, IdentityError> {
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::Expired,
        _ => IdentityError::InvalidToken,
    })?;

    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";

    #[test]
    fn issued_token_verifies_to_same_user() {
        let token = issue_token(SECRET, "user-123").unwrap();
        let sub = verify_token(SECRET, &token).unwrap();
        assert_eq!(sub, "user-123");
    }

    #[test]
    fn token_rejected_under_wrong_secret() {
        let token = issue_token(SECRET, "user-123").unwrap();
        let err = verify_token("a-different-secret", &token).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken));
    }

    #[test]
    fn tampered_token_rejected() {
        let token = issue_token(SECRET, "user-123").unwrap();
        // Flip the last character of the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        let err = verify_token(SECRET, &tampered).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken));
    }

    #[test]
    fn expired_token_rejected() {
        let token = issue_token_with_ttl(SECRET, "user-123", -3600).unwrap();
        let err = verify_token(SECRET, &token).unwrap_err();
        assert!(matches!(err, IdentityError::Expired));
    }

    #[test]
    fn garbage_token_rejected() {
        let err = verify_token(SECRET, "not-a-jwt").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken));
    }
}
