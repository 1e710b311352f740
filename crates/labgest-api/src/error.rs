//! API error handling
//!
//! Validation failures short-circuit the pipeline and surface as a
//! structured body with code + message. Operational failures are logged
//! with context and surfaced as generic 500s without leaking internals.
//! The kind -> status mapping lives in exactly one place:
//! [`AppError::into_response`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::notify::NotifyError;
use crate::repository::RepositoryError;
use crate::session::SessionStoreError;

/// API error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Unknown email or wrong password - deliberately indistinguishable
    InvalidCredentials,
    Unauthorized,
    SessionExpired,
    Forbidden(String),
    Conflict(String),
    /// Session backend failure
    Store(String),
    /// Token signing failure
    Signing(String),
    /// Notification publish failure
    Publish(String),
    Database(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ApiError::new("NOT_FOUND", format!("{msg} not found")),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("INVALID_CREDENTIALS", "Password is wrong"),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", "Authentication required"),
            ),
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("SESSION_EXPIRED", "Session expired or invalid"),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Store(msg) => {
                error!(error = %msg, "session store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("STORE_ERROR", "Internal server error"),
                )
            }
            AppError::Signing(msg) => {
                error!(error = %msg, "token signing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("SIGNING_ERROR", "Internal server error"),
                )
            }
            AppError::Publish(msg) => {
                error!(error = %msg, "notification publish failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("PUBLISH_ERROR", "Internal server error"),
                )
            }
            AppError::Database(msg) => {
                error!(error = %msg, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("DATABASE_ERROR", "Internal server error"),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", "Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<SessionStoreError> for AppError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::SessionNotFound => AppError::SessionExpired,
            other => AppError::Store(other.to_string()),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        AppError::Signing(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::Publish(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => AppError::NotFound(what),
            RepositoryError::Duplicate(what) => AppError::Conflict(what),
            RepositoryError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<labgest_core::LabgestError> for AppError {
    fn from(err: labgest_core::LabgestError) -> Self {
        use labgest_core::LabgestError;

        match err {
            LabgestError::NotFound(msg) => AppError::NotFound(msg),
            LabgestError::ValidationError(msg) => AppError::BadRequest(msg),
            LabgestError::DatabaseError(msg) => AppError::Database(msg),
            LabgestError::ConfigError(msg) => AppError::Internal(msg),
            LabgestError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_maps_to_401_with_message() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_operational_errors_map_to_500() {
        for err in [
            AppError::Store("redis down".to_string()),
            AppError::Signing("bad key".to_string()),
            AppError::Publish("redis down".to_string()),
            AppError::Database("pg down".to_string()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_session_not_found_becomes_session_expired() {
        let err: AppError = SessionStoreError::SessionNotFound.into();
        assert!(matches!(err, AppError::SessionExpired));

        let err: AppError = SessionStoreError::Backend("io".to_string()).into();
        assert!(matches!(err, AppError::Store(_)));
    }
}
