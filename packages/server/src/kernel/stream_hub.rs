//! In-process pub/sub hub for live updates.
//!
//! Topic-keyed broadcast channels. Producers publish after a write has been
//! accepted by the store; SSE endpoints and engagement bindings subscribe.
//! Topics are opaque strings; payloads are JSON values with a `type` field.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    /// Hub with 256 buffered messages per topic.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish to a topic. No-op without subscribers.
    pub async fn publish<T: Serialize>(&self, topic: &str, payload: &T) {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Dropping unserializable stream payload");
                return;
            }
        };

        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(topic) {
            // No active receivers is fine
            let _ = tx.send(value);
        }
    }

    /// Subscribe to a topic, creating the channel on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Topics with a live channel, listened to or not.
    pub async fn topic_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Drop topics nobody listens to anymore.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let hub = StreamHub::new();
        let mut rx = hub.subscribe("engagement:abc").await;

        hub.publish("engagement:abc", &json!({"type": "likes_changed"}))
            .await;

        assert_eq!(rx.recv().await.unwrap(), json!({"type": "likes_changed"}));
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let hub = StreamHub::new();
        let mut rx = hub.subscribe("engagement:a").await;

        hub.publish("engagement:b", &json!({"type": "x"})).await;
        hub.publish("engagement:a", &json!({"type": "y"})).await;

        assert_eq!(rx.recv().await.unwrap(), json!({"type": "y"}));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = StreamHub::new();
        hub.publish("nobody:listening", &json!({"dropped": true}))
            .await;
        assert!(hub.channels.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_removes_idle_topics() {
        let hub = StreamHub::new();
        let rx = hub.subscribe("engagement:gone").await;
        drop(rx);
        hub.cleanup().await;
        assert!(hub.channels.read().await.is_empty());
    }
}
