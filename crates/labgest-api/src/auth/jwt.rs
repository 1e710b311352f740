//! JWT token generation and validation
//!
//! Implements JWT-based authentication with HMAC-SHA256 signing. A token
//! is self-verifying (signature + expiry) but is never accepted on its own:
//! the auth gateway cross-checks the embedded session id against the
//! session store, which is what makes logout an actual revocation.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use labgest_core::{Account, AuthConfig};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// JWT Claims structure containing user identity and scope snapshot
///
/// These claims are embedded in the access token and extracted during
/// validation. `profiles` is a point-in-time snapshot of the user's
/// profile associations; it is not re-evaluated until the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID (decimal string)
    pub sub: String,
    /// User's display name
    pub username: String,
    /// User's email address
    pub email: String,
    /// Session id cross-checked against the session store
    pub session_id: String,
    /// Authorization-scope snapshot: profile names at issuance time
    pub profiles: Vec<String>,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

impl Claims {
    /// Parse the subject claim back into a user id.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// Case-insensitive scope check against the snapshot.
    pub fn has_profile(&self, profile: &str) -> bool {
        self.profiles.iter().any(|p| p.eq_ignore_ascii_case(profile))
    }
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    Invalid,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// Generate a signed access token for a verified account.
///
/// # Arguments
///
/// * `config` - Auth configuration carrying the secret and validity window
/// * `account` - The verified account identity
/// * `profiles` - Profile names snapshot captured at login
/// * `session_id` - Freshly generated opaque session id
///
/// # Errors
///
/// Returns `JwtError` if signing fails or the clock is broken. Signing
/// failures surface to the caller as an internal error; the login aborts.
pub fn generate_access_token(
    config: &AuthConfig,
    account: &Account,
    profiles: &[String],
    session_id: &str,
) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: account.id.to_string(),
        username: account.name.clone(),
        email: account.email.clone(),
        session_id: session_id.to_string(),
        profiles: profiles.to_vec(),
        iat: now,
        exp: now + config.token_ttl_secs,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a token and extract its claims.
///
/// # Errors
///
/// * `JwtError::InvalidSignature` - signature does not verify (tampering)
/// * `JwtError::Expired` - the validity window has elapsed
/// * `JwtError::Invalid` - any other parse or validation failure
pub fn validate_access_token(config: &AuthConfig, token: &str) -> Result<Claims, JwtError> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::Invalid,
    })?;

    Ok(token_data.claims)
}
