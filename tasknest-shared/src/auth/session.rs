/// Session token validation
///
/// TaskNest does not authenticate credentials itself: the identity service
/// does, and issues an HS256-signed session token carrying the user's ID.
/// This module validates those tokens and recovers the claims. Token
/// *creation* also lives here so provisioning tools and tests can mint
/// sessions with the shared secret.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Lifetime**: 14 days from issue
/// - **Validation**: signature, expiration, and issuer checks
/// - **Secret**: shared with the identity service, at least 32 bytes
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::session::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id), "a-32-byte-minimum-shared-secret!!")?;
/// let claims = validate_token(&token, "a-32-byte-minimum-shared-secret!!")?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every session token
pub const ISSUER: &str = "tasknest-identity";

/// Session lifetime, matching the identity service's long-lived sessions
const SESSION_LIFETIME_DAYS: i64 = 14;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed signature or claims validation
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by something other than the identity service
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's ID
    pub sub: Uuid,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the default session lifetime
    pub fn new(user_id: Uuid) -> Self {
        Self::with_lifetime(user_id, Duration::days(SESSION_LIFETIME_DAYS))
    }

    /// Creates claims with a custom lifetime (negative lifetimes produce
    /// already-expired tokens, which the tests rely on)
    pub fn with_lifetime(user_id: Uuid, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

/// Signs claims into a session token
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, SessionTokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionTokenError::CreateError(e.to_string()))
}

/// Validates a session token and returns its claims
///
/// Checks the signature, the expiration, and that the issuer is the
/// identity service.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, SessionTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionTokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => SessionTokenError::InvalidIssuer,
        _ => SessionTokenError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id), SECRET).unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&Claims::new(Uuid::new_v4()), SECRET).unwrap();

        let result = validate_token(&token, "another-secret-also-32-bytes-long!");
        assert!(matches!(result, Err(SessionTokenError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::with_lifetime(Uuid::new_v4(), Duration::days(-1));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(SessionTokenError::Expired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_token("not-a-token", SECRET);
        assert!(result.is_err());
    }
}
