//! Authentication API handlers
//!
//! Login, logout, session enumeration, token validation, and the
//! password-reset flow.

use super::validate_request;
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::auth::jwt::validate_access_token;
use crate::auth::middleware::AuthContext;
use crate::auth::service::{LoginRequest, PasswordReset, PasswordResetRequest};
use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Login response carrying the signed bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Token validation response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    pub user_id: i64,
    pub email: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Login with email and password
///
/// On success the returned token embeds the freshly stored session id and
/// the user's profile snapshot.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    match state.auth.login(&request).await {
        Ok(token) => {
            if let Ok(claims) = validate_access_token(&state.config.auth, &token) {
                audit_log(&AuditEvent::LoginSuccess {
                    user_id: claims.user_id().unwrap_or_default(),
                    email: claims.email,
                    session_id: claims.session_id,
                    ip_address,
                    user_agent,
                });
            }
            Ok(Json(LoginResponse { token }))
        }
        Err(err) => {
            audit_log(&AuditEvent::LoginFailure {
                email: request.email.clone(),
                reason: match &err {
                    AppError::InvalidCredentials => "invalid credentials".to_string(),
                    _ => "internal error".to_string(),
                },
                ip_address,
                user_agent,
            });
            Err(err)
        }
    }
}

/// Check that the presented token still maps to a live session
#[utoipa::path(
    get,
    path = "/api/auth/validate",
    tag = "auth",
    responses(
        (status = 200, description = "Token and session are valid", body = ValidateResponse),
        (status = 401, description = "Session expired or invalid", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .validate_session(&ctx.claims.session_id, ctx.user_id)
        .await?;

    Ok(Json(ValidateResponse {
        valid: true,
        user_id: ctx.user_id,
        email: ctx.claims.email.clone(),
        username: ctx.claims.username.clone(),
    }))
}

/// Logout the current session
///
/// Removes the session matching the presented token; other sessions of
/// the same user stay valid.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(ctx.user_id, &ctx.token).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// List the caller's live sessions (multi-device)
#[utoipa::path(
    get,
    path = "/api/auth/sessions",
    tag = "auth",
    responses(
        (status = 200, description = "Live sessions", body = [Session]),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.auth.sessions(ctx.user_id).await?;
    Ok(Json(sessions))
}

/// Request a password-reset token for an email
///
/// Responds identically whether or not the email maps to an account.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    tag = "auth",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Accepted", body = MessageResponse),
    )
)]
pub async fn password_reset_request_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    state.auth.request_password_reset(&request.email).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "If the account exists, a reset token has been issued".to_string(),
        }),
    ))
}

/// Consume a reset token and set a new password
#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    tag = "auth",
    request_body = PasswordReset,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 401, description = "Unknown or expired token", body = crate::error::ApiError),
    )
)]
pub async fn password_reset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordReset>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    state
        .auth
        .reset_password(&request.token, &request.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password reset successful".to_string(),
    }))
}
