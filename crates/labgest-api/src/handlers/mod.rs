//! HTTP request handlers
//!
//! Handlers stay thin: extract, validate, call a service or repository,
//! map the result. Identity arrives as a typed `Extension<AuthContext>`
//! inserted by the auth gateway.

pub mod auth;
pub mod doctors;
pub mod health;
pub mod hospitals;
pub mod notifications;
pub mod pieces;
pub mod profiles;
pub mod users;

use crate::error::AppError;
use validator::Validate;

/// Run the derive-generated validations on a request body.
pub(crate) fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
