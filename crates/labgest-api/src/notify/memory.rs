//! In-memory notification bus for tests, one broadcast channel per user.

use super::{NotificationBus, NotifyError};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
pub struct MemoryNotificationBus {
    channels: Mutex<HashMap<i64, broadcast::Sender<String>>>,
}

impl MemoryNotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender_for(&self, user_id: i64) -> broadcast::Sender<String> {
        let mut channels = self.channels.lock().expect("bus lock poisoned");
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait::async_trait]
impl NotificationBus for MemoryNotificationBus {
    async fn publish(&self, user_id: i64, payload: &str) -> Result<(), NotifyError> {
        // No subscribers is not an error, matching pub/sub semantics.
        let _ = self.sender_for(user_id).send(payload.to_string());
        Ok(())
    }

    async fn subscribe(&self, user_id: i64) -> Result<BoxStream<'static, String>, NotifyError> {
        let rx = self.sender_for(user_id).subscribe();

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => return Some((payload, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed();

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = MemoryNotificationBus::new();
        bus.publish(1, "hello").await.expect("publish");
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_payloads() {
        let bus = MemoryNotificationBus::new();

        let mut stream = bus.subscribe(1).await.expect("subscribe");
        bus.publish(1, "one").await.expect("publish");
        bus.publish(1, "two").await.expect("publish");

        assert_eq!(stream.next().await, Some("one".to_string()));
        assert_eq!(stream.next().await, Some("two".to_string()));
    }

    #[tokio::test]
    async fn test_channels_are_per_user() {
        let bus = MemoryNotificationBus::new();

        let mut for_alice = bus.subscribe(1).await.expect("subscribe");
        bus.publish(2, "for bob").await.expect("publish");
        bus.publish(1, "for alice").await.expect("publish");

        assert_eq!(for_alice.next().await, Some("for alice".to_string()));
    }
}
