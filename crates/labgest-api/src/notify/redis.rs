//! Redis pub/sub implementation of the notification bus
//!
//! Publishing goes through the shared [`ConnectionManager`]; each
//! subscriber gets its own pub/sub connection, which lives as long as the
//! returned stream.

use super::{channel_for, NotificationBus, NotifyError};
use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use futures::stream::BoxStream;
use futures::StreamExt;

impl From<::redis::RedisError> for NotifyError {
    fn from(err: ::redis::RedisError) -> Self {
        NotifyError::Backend(err.to_string())
    }
}

pub struct RedisNotificationBus {
    client: ::redis::Client,
    manager: ConnectionManager,
}

impl RedisNotificationBus {
    /// Connect to Redis and build the bus.
    pub async fn connect(url: &str) -> Result<Self, NotifyError> {
        let client = ::redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { client, manager })
    }
}

#[async_trait::async_trait]
impl NotificationBus for RedisNotificationBus {
    async fn publish(&self, user_id: i64, payload: &str) -> Result<(), NotifyError> {
        let mut conn = self.manager.clone();
        let _: () = conn.publish(channel_for(user_id), payload).await?;
        Ok(())
    }

    async fn subscribe(&self, user_id: i64) -> Result<BoxStream<'static, String>, NotifyError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel_for(user_id)).await?;

        let stream = pubsub
            .into_on_message()
            .filter_map(|msg| async move { msg.get_payload::<String>().ok() })
            .boxed();

        Ok(stream)
    }
}
