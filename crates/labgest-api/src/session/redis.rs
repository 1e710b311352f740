//! Redis implementation of the session store
//!
//! Uses a multiplexed [`ConnectionManager`] for commands. One hash per
//! user, one string key per outstanding password-reset token.

use super::{
    reset_token_key, sessions_key, ResetTokenStore, Session, SessionStore, SessionStoreError,
};
use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

impl From<::redis::RedisError> for SessionStoreError {
    fn from(err: ::redis::RedisError) -> Self {
        SessionStoreError::Backend(err.to_string())
    }
}

/// Session store backed by Redis.
pub struct RedisSessionStore {
    manager: ConnectionManager,
    /// TTL applied to each user's session hash, aligned with the token
    /// validity window and refreshed on every login.
    session_ttl: Duration,
}

impl RedisSessionStore {
    /// Connect to Redis and build the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Backend` when the server is
    /// unreachable, so a misconfigured backend is discovered at startup
    /// rather than on the first login.
    pub async fn connect(url: &str, session_ttl: Duration) -> Result<Self, SessionStoreError> {
        let client = ::redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self {
            manager,
            session_ttl,
        })
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn store(&self, user_id: i64, session: &Session) -> Result<(), SessionStoreError> {
        let key = sessions_key(user_id);
        let payload = serde_json::to_string(session)?;

        let mut conn = self.manager.clone();
        let _: () = conn.hset(&key, &session.session_id, payload).await?;
        let _: () = conn
            .expire(&key, self.session_ttl.as_secs() as i64)
            .await?;

        Ok(())
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Session>, SessionStoreError> {
        let key = sessions_key(user_id);

        let mut conn = self.manager.clone();
        let entries: HashMap<String, String> = conn.hgetall(&key).await?;

        let mut sessions = Vec::with_capacity(entries.len());
        for (field, raw) in entries {
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => sessions.push(session),
                Err(err) => {
                    warn!(user_id, field = %field, error = %err, "skipping corrupt session entry");
                }
            }
        }

        Ok(sessions)
    }

    async fn remove_by_token(&self, user_id: i64, token: &str) -> Result<(), SessionStoreError> {
        let key = sessions_key(user_id);

        let mut conn = self.manager.clone();
        let entries: HashMap<String, String> = conn.hgetall(&key).await?;

        for (field, raw) in entries {
            let session = match serde_json::from_str::<Session>(&raw) {
                Ok(session) => session,
                Err(err) => {
                    warn!(user_id, field = %field, error = %err, "skipping corrupt session entry");
                    continue;
                }
            };

            if session.token == token {
                let _: () = conn.hdel(&key, &field).await?;
                break;
            }
        }

        Ok(())
    }

    async fn validate(&self, session_id: &str, user_id: i64) -> Result<(), SessionStoreError> {
        let key = sessions_key(user_id);

        let mut conn = self.manager.clone();
        let exists: bool = conn.hexists(&key, session_id).await?;

        if exists {
            Ok(())
        } else {
            Err(SessionStoreError::SessionNotFound)
        }
    }
}

#[async_trait::async_trait]
impl ResetTokenStore for RedisSessionStore {
    async fn put_reset_token(
        &self,
        token: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(reset_token_key(token), email, ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn get_reset_token(&self, token: &str) -> Result<Option<String>, SessionStoreError> {
        let mut conn = self.manager.clone();
        let email: Option<String> = conn.get(reset_token_key(token)).await?;
        Ok(email)
    }

    async fn remove_reset_token(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(reset_token_key(token)).await?;
        Ok(())
    }
}
