//! Repository layer for the domain entities
//!
//! Thin data access over Postgres. One repository per aggregate; each
//! holds a cloned pool handle and maps `sqlx` failures onto
//! [`RepositoryError`]. The user repository doubles as the
//! [`labgest_core::AccountStore`] collaborator consumed by the auth
//! layer.

pub mod doctors;
pub mod hospitals;
pub mod notifications;
pub mod pieces;
pub mod profiles;
pub mod users;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use doctors::DoctorRepository;
pub use hospitals::HospitalRepository;
pub use notifications::NotificationRepository;
pub use pieces::PieceRepository;
pub use profiles::ProfileRepository;
pub use users::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryAccountStore;

use thiserror::Error;

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}
