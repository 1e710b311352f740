//! Notification fan-out
//!
//! Domain events are published to a per-user channel
//! (`user_notifications:<id>`) and relayed to any live WebSocket
//! subscriber for that user. Zero subscribers is fine; delivery is
//! fire-and-forget pub/sub.

mod redis;
mod ws;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use self::redis::RedisNotificationBus;
pub use self::ws::notifications_live;

#[cfg(any(test, feature = "test-utils"))]
pub use self::memory::MemoryNotificationBus;

use futures::stream::BoxStream;
use thiserror::Error;

/// Notification fan-out errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to serialize notification payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("notification backend error: {0}")]
    Backend(String),
}

/// Per-user pub/sub channel name
pub(crate) fn channel_for(user_id: i64) -> String {
    format!("user_notifications:{user_id}")
}

/// The pub/sub seam between event producers and live WebSocket readers.
#[async_trait::async_trait]
pub trait NotificationBus: Send + Sync {
    /// Publish an already-serialized event payload to the user's channel.
    async fn publish(&self, user_id: i64, payload: &str) -> Result<(), NotifyError>;

    /// Subscribe to the user's channel. Each item is one published
    /// payload, in publish order.
    async fn subscribe(&self, user_id: i64) -> Result<BoxStream<'static, String>, NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_for(7), "user_notifications:7");
    }
}
