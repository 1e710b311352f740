//! Notification handlers
//!
//! Creating a notification persists the row, then publishes it to the
//! user's channel so any live WebSocket reader sees it immediately. A
//! publish failure surfaces to the caller as a 500; the row stays.

use super::validate_request;
use crate::auth::middleware::AuthContext;
use crate::error::AppError;
use crate::models::{CreateNotificationRequest, Notification};
use crate::notify::NotifyError;
use crate::repository::NotificationRepository;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

/// Create and fan out a notification
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created and published", body = Notification),
        (status = 500, description = "Publish failure", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let notification = NotificationRepository::new(state.db.clone())
        .create(request.user_id, &request.message)
        .await?;

    let payload = serde_json::to_string(&notification).map_err(NotifyError::from)?;
    state
        .notifier
        .publish(notification.user_id, &payload)
        .await?;

    info!(user_id = notification.user_id, "notification sent");

    Ok((StatusCode::CREATED, Json(notification)))
}

/// The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = NotificationRepository::new(state.db.clone())
        .find_for_user(ctx.user_id)
        .await?;
    Ok(Json(notifications))
}

/// Mark a notification as seen
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/seen",
    tag = "notifications",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification updated", body = Notification),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_as_seen(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let notification = NotificationRepository::new(state.db.clone())
        .mark_as_seen(id)
        .await?;
    Ok(Json(notification))
}
