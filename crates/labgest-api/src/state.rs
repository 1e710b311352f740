//! Application state management
//!
//! Everything a handler needs hangs off [`AppState`]: configuration, the
//! Postgres pool for the domain repositories, and the trait-object
//! backends (accounts, sessions, reset tokens, notification bus). The
//! backends are explicit constructor arguments, so production wires Redis
//! and Postgres while tests wire the in-memory implementations.

use crate::auth::AuthService;
use crate::notify::NotificationBus;
use crate::session::{ResetTokenStore, SessionStore};
use labgest_core::{AccountStore, AppConfig};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Pool for the domain repositories
    pub db: PgPool,
    /// User-account collaborator
    pub accounts: Arc<dyn AccountStore>,
    /// Session store (single source of truth for session liveness)
    pub sessions: Arc<dyn SessionStore>,
    /// Password-reset token side channel
    pub reset_tokens: Arc<dyn ResetTokenStore>,
    /// Notification fan-out
    pub notifier: Arc<dyn NotificationBus>,
    /// Authentication service wired over the backends above
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: PgPool,
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        notifier: Arc<dyn NotificationBus>,
    ) -> Self {
        let auth = AuthService::new(
            config.auth.clone(),
            accounts.clone(),
            sessions.clone(),
            reset_tokens.clone(),
        );

        Self {
            config,
            start_time: Instant::now(),
            db,
            accounts,
            sessions,
            reset_tokens,
            notifier,
            auth,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Handles to the in-memory backends behind a test state, for seeding
/// accounts and publishing events from tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestBackends {
    pub accounts: Arc<crate::repository::MemoryAccountStore>,
    pub sessions: Arc<crate::session::MemorySessionStore>,
    pub notifier: Arc<crate::notify::MemoryNotificationBus>,
}

#[cfg(any(test, feature = "test-utils"))]
impl AppState {
    /// State over in-memory backends with the default config.
    pub fn for_testing() -> Self {
        Self::for_testing_with_config(AppConfig::default()).0
    }

    /// State over in-memory backends with an explicit config, plus the
    /// backend handles.
    pub fn for_testing_with_config(config: AppConfig) -> (Self, TestBackends) {
        let accounts = Arc::new(crate::repository::MemoryAccountStore::new());
        let sessions = Arc::new(crate::session::MemorySessionStore::new());
        let notifier = Arc::new(crate::notify::MemoryNotificationBus::new());

        // Lazy pool: nothing here ever connects, the domain repositories
        // are not exercised against the in-memory backends.
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");

        let state = Self::new(
            config,
            db,
            accounts.clone(),
            sessions.clone(),
            sessions.clone(),
            notifier.clone(),
        );

        let backends = TestBackends {
            accounts,
            sessions,
            notifier,
        };

        (state, backends)
    }
}
