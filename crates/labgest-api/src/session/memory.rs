//! In-memory session store for tests
//!
//! Mirrors the Redis layout: raw JSON strings in a per-user map keyed by
//! session id, so corrupt-entry tolerance and duplicate collapsing behave
//! exactly as they do against the real backend. Reset-token TTLs are not
//! enforced here.

use super::{ResetTokenStore, Session, SessionStore, SessionStoreError};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<i64, HashMap<String, String>>>,
    reset_tokens: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a raw hash entry, bypassing serialization. Lets tests plant
    /// corrupt values next to valid ones.
    pub async fn insert_raw(&self, user_id: i64, field: &str, raw: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id)
            .or_default()
            .insert(field.to_string(), raw.to_string());
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn store(&self, user_id: i64, session: &Session) -> Result<(), SessionStoreError> {
        let payload = serde_json::to_string(session)?;
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id)
            .or_default()
            .insert(session.session_id.clone(), payload);
        Ok(())
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Session>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        let Some(entries) = sessions.get(&user_id) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(entries.len());
        for (field, raw) in entries {
            match serde_json::from_str::<Session>(raw) {
                Ok(session) => out.push(session),
                Err(err) => {
                    warn!(user_id, field = %field, error = %err, "skipping corrupt session entry");
                }
            }
        }

        Ok(out)
    }

    async fn remove_by_token(&self, user_id: i64, token: &str) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let Some(entries) = sessions.get_mut(&user_id) else {
            return Ok(());
        };

        let matched = entries.iter().find_map(|(field, raw)| {
            serde_json::from_str::<Session>(raw)
                .ok()
                .filter(|session| session.token == token)
                .map(|_| field.clone())
        });

        if let Some(field) = matched {
            entries.remove(&field);
        }

        Ok(())
    }

    async fn validate(&self, session_id: &str, user_id: i64) -> Result<(), SessionStoreError> {
        let sessions = self.sessions.read().await;
        let live = sessions
            .get(&user_id)
            .is_some_and(|entries| entries.contains_key(session_id));

        if live {
            Ok(())
        } else {
            Err(SessionStoreError::SessionNotFound)
        }
    }
}

#[async_trait::async_trait]
impl ResetTokenStore for MemorySessionStore {
    async fn put_reset_token(
        &self,
        token: &str,
        email: &str,
        _ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut tokens = self.reset_tokens.write().await;
        tokens.insert(token.to_string(), email.to_string());
        Ok(())
    }

    async fn get_reset_token(&self, token: &str) -> Result<Option<String>, SessionStoreError> {
        let tokens = self.reset_tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn remove_reset_token(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut tokens = self.reset_tokens.write().await;
        tokens.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: i64, session_id: &str, token: &str) -> Session {
        Session {
            user_id,
            email: format!("user{user_id}@example.com"),
            username: format!("user{user_id}"),
            token: token.to_string(),
            session_id: session_id.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_store_then_list_and_validate() {
        let store = MemorySessionStore::new();

        store.store(1, &session(1, "s1", "t1")).await.expect("store");
        store.store(1, &session(1, "s2", "t2")).await.expect("store");

        let sessions = store.list(1).await.expect("list");
        assert_eq!(sessions.len(), 2);

        store.validate("s1", 1).await.expect("s1 live");
        store.validate("s2", 1).await.expect("s2 live");
        assert!(matches!(
            store.validate("s1", 2).await,
            Err(SessionStoreError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_empty_is_empty_not_error() {
        let store = MemorySessionStore::new();
        let sessions = store.list(99).await.expect("list");
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_store_collapses() {
        let store = MemorySessionStore::new();
        let s = session(1, "s1", "t1");

        store.store(1, &s).await.expect("store");
        store.store(1, &s).await.expect("store again");

        assert_eq!(store.list(1).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_entries() {
        let store = MemorySessionStore::new();
        store.store(1, &session(1, "s1", "t1")).await.expect("store");
        store.store(1, &session(1, "s2", "t2")).await.expect("store");
        store.insert_raw(1, "broken", "{not json").await;

        let sessions = store.list(1).await.expect("list");
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_by_token() {
        let store = MemorySessionStore::new();
        store.store(1, &session(1, "s1", "t1")).await.expect("store");
        store.store(1, &session(1, "s2", "t2")).await.expect("store");

        store.remove_by_token(1, "t1").await.expect("remove");

        let sessions = store.list(1).await.expect("list");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "s2");
        assert!(matches!(
            store.validate("s1", 1).await,
            Err(SessionStoreError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_unknown_token_is_noop() {
        let store = MemorySessionStore::new();
        store.store(1, &session(1, "s1", "t1")).await.expect("store");

        store
            .remove_by_token(1, "no-such-token")
            .await
            .expect("no-op");
        store.remove_by_token(42, "t1").await.expect("no-op");

        assert_eq!(store.list(1).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_reset_tokens() {
        let store = MemorySessionStore::new();

        store
            .put_reset_token("tok", "a@b.c", Duration::from_secs(60))
            .await
            .expect("put");
        assert_eq!(
            store.get_reset_token("tok").await.expect("get"),
            Some("a@b.c".to_string())
        );

        store.remove_reset_token("tok").await.expect("remove");
        assert_eq!(store.get_reset_token("tok").await.expect("get"), None);
    }
}
