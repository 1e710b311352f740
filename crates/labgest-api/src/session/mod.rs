//! Redis-backed multi-session store
//!
//! A user may hold multiple concurrent sessions (multi-device). Each
//! user's sessions live in the hash `user:<id>:sessions`, keyed by
//! session id with the serialized record as the value. Keying by session
//! id makes `validate` a single HEXISTS instead of a linear scan, and the
//! hash key carries a TTL aligned with the token validity window so a
//! user who never logs out does not accumulate stale entries forever.
//!
//! The store is the single source of truth for session liveness: a token
//! whose signature is still fresh is rejected the moment its session is
//! removed. There is no in-process caching; every validation round-trips
//! to the backend.

mod redis;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use self::redis::RedisSessionStore;

#[cfg(any(test, feature = "test-utils"))]
pub use self::memory::MemorySessionStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One live login, independently revocable from the token's cryptographic
/// validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    /// The signed token string issued for this session, matched exactly
    /// on logout
    pub token: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Session store errors
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Covers both "never existed" and "removed or expired"; callers
    /// cannot distinguish the two.
    #[error("session not found or expired")]
    SessionNotFound,

    #[error("session backend error: {0}")]
    Backend(String),

    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Redis key for a user's session hash
pub(crate) fn sessions_key(user_id: i64) -> String {
    format!("user:{user_id}:sessions")
}

/// Redis key for a password-reset token
pub(crate) fn reset_token_key(token: &str) -> String {
    format!("pwd_reset:{token}")
}

/// The session backend consumed by the auth layer.
///
/// No locking anywhere: concurrent login/logout for the same user race at
/// the hash level, but per-field writes keep that safe. The only
/// observable effect is order-dependent visibility in a racing `list`.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Add a session to the user's set. Idempotent by session id.
    async fn store(&self, user_id: i64, session: &Session) -> Result<(), SessionStoreError>;

    /// All sessions for a user. Corrupt entries are logged and skipped,
    /// never failing the whole call; a user with no sessions gets an
    /// empty list. Entries whose embedded token already expired are still
    /// returned: expiry is the token's concern, not the store's.
    async fn list(&self, user_id: i64) -> Result<Vec<Session>, SessionStoreError>;

    /// Remove the first session whose token matches exactly. A missing
    /// token is a no-op; only backend I/O failures error.
    async fn remove_by_token(&self, user_id: i64, token: &str) -> Result<(), SessionStoreError>;

    /// Succeeds iff the session id is live for the user.
    async fn validate(&self, session_id: &str, user_id: i64) -> Result<(), SessionStoreError>;
}

/// Opaque password-reset token storage, the side channel of the reset
/// flow. Implemented by the same backends as [`SessionStore`].
#[async_trait::async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn put_reset_token(
        &self,
        token: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// The email the token was issued for, or `None` when unknown or
    /// expired.
    async fn get_reset_token(&self, token: &str) -> Result<Option<String>, SessionStoreError>;

    async fn remove_reset_token(&self, token: &str) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(sessions_key(17), "user:17:sessions");
        assert_eq!(reset_token_key("abc"), "pwd_reset:abc");
    }

    #[test]
    fn test_session_tolerates_missing_created_at() {
        // Entries written before the created_at field existed still parse.
        let raw = r#"{"user_id":1,"email":"a@b.c","username":"a","token":"t","session_id":"s"}"#;
        let session: Session = serde_json::from_str(raw).expect("parse");
        assert_eq!(session.session_id, "s");
        assert!(session.created_at.is_none());
    }
}
