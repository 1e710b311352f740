//! Labgest Core - Configuration, shared errors, and collaborator seams
//!
//! This crate defines the abstractions shared across the labgest system:
//! - Common error types
//! - Configuration management
//! - The user-account collaborator seam consumed by the auth layer

pub mod config;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, RedisConfig, ServerConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for labgest operations
#[derive(Error, Debug)]
pub enum LabgestError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LabgestError>;

// ============================================================================
// Account Seam
// ============================================================================

/// Read-only credential view of a user account.
///
/// Owned by the user-account collaborator; the auth layer only ever reads
/// it to verify a submitted password and mint a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    /// Display name, embedded into issued tokens
    pub name: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

/// The user-account collaborator consumed by the auth layer.
///
/// Implemented by the Postgres repository in production and by an
/// in-memory store under the `test-utils` feature of `labgest-api`.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by email. `Ok(None)` when no such account exists.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Profile names associated with the user, captured into tokens as the
    /// authorization-scope snapshot at login time.
    async fn profiles_for_user(&self, user_id: i64) -> Result<Vec<String>>;

    /// Replace the stored password hash, used by the password-reset flow.
    async fn set_password(&self, user_id: i64, password_hash: &str) -> Result<()>;
}
