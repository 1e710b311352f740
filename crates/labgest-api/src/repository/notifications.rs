//! Notification repository
//!
//! Persistence only; the live fan-out happens in the handler through the
//! notification bus after the row is written.

use super::RepositoryError;
use crate::models::Notification;
use sqlx::PgPool;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, seen, created_at";

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        message: &str,
    ) -> Result<Notification, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (user_id, message, seen, created_at) \
             VALUES ($1, $2, false, NOW()) RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn find_for_user(&self, user_id: i64) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Notification, RepositoryError> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("notification".to_string()))
    }

    pub async fn mark_as_seen(&self, id: i64) -> Result<Notification, RepositoryError> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET seen = true WHERE id = $1 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("notification".to_string()))
    }
}
