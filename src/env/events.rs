//! Event bus announcing plugin load completion.
//!
//! Uses [`tokio::sync::broadcast`] for fan-out delivery. Publishing is
//! fire-and-forget: with no subscribers the event is dropped.

use crate::core::{PluginExport, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

/// Announced once per successful load.
#[derive(Clone, Debug)]
pub struct PluginLoadedEvent {
    /// Plugin name
    pub name: String,
    /// Resolved export
    pub export: PluginExport,
    /// Completion time
    pub loaded_at: Timestamp,
}

impl PluginLoadedEvent {
    /// Topic string, `plugin:<name>:loaded`.
    pub fn topic(&self) -> String {
        format!("plugin:{}:loaded", self.name)
    }
}

/// Broadcast-based event bus.
pub struct EventBus {
    sender: broadcast::Sender<PluginLoadedEvent>,
    published: AtomicU64,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    ///
    /// Lagging subscribers lose the oldest events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: PluginLoadedEvent) {
        self.published.fetch_add(1, Ordering::Relaxed);
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    /// Subscribe to subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<PluginLoadedEvent> {
        self.sender.subscribe()
    }

    /// Number of events published so far.
    pub fn total_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Current subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::now;

    fn event(name: &str) -> PluginLoadedEvent {
        PluginLoadedEvent {
            name: name.to_string(),
            export: PluginExport::new(()),
            loaded_at: now(),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        bus.publish(event("a"));
        assert_eq!(bus.total_published(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(event("gallery"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.name, "gallery");
        assert_eq!(received.topic(), "plugin:gallery:loaded");
    }
}
