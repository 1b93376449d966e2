//! Status fan-out to connected subscribers.
//!
//! Lifecycle events are global: every broadcast goes to every subscriber,
//! not just the connection that happened to trigger it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::events::StatusEvent;
use super::subscriber::Subscriber;

/// Maximum total lifetime frame drops before forcibly disconnecting a slow
/// subscriber.
const MAX_TOTAL_DROPS: u64 = 100;

/// Registry of connected subscribers.
pub struct SubscriberRegistry {
    /// Connected subscribers indexed by connection ID.
    connections: RwLock<HashMap<String, Arc<Subscriber>>>,
    /// Atomic count of connections (avoids read-locking for count queries).
    active_count: AtomicUsize,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Add a subscriber.
    pub async fn add(&self, subscriber: Arc<Subscriber>) {
        let mut conns = self.connections.write().await;
        if conns.insert(subscriber.id.clone(), subscriber).is_none() {
            let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Remove a subscriber by ID, cancelling its heartbeat.
    pub async fn remove(&self, id: &str) {
        let mut conns = self.connections.write().await;
        if let Some(subscriber) = conns.remove(id) {
            subscriber.cancel_heartbeat();
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Cancel every subscriber's heartbeat (lifecycle transition).
    pub async fn cancel_heartbeats(&self) {
        let conns = self.connections.read().await;
        for subscriber in conns.values() {
            subscriber.cancel_heartbeat();
        }
    }

    /// Broadcast an event to every connected subscriber.
    ///
    /// Serializes once and fans the `Arc` out. Subscribers that have dropped
    /// more than [`MAX_TOTAL_DROPS`] frames over their lifetime are removed.
    pub async fn broadcast(&self, event: &StatusEvent) {
        let frame = match serde_json::to_string(event) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(event = event.name(), error = %e, "failed to serialize event");
                return;
            }
        };

        let mut to_remove = Vec::new();
        {
            let conns = self.connections.read().await;
            let mut recipients = 0u32;
            for subscriber in conns.values() {
                recipients += 1;
                if !subscriber.send(Arc::clone(&frame)) {
                    let drops = subscriber.drop_count();
                    if drops >= MAX_TOTAL_DROPS {
                        warn!(id = %subscriber.id, drops, "disconnecting slow subscriber");
                        to_remove.push(subscriber.id.clone());
                    } else {
                        warn!(id = %subscriber.id, drops, "failed to send event (channel full)");
                    }
                }
            }
            debug!(event = event.name(), recipients, "broadcast event");
        }

        for id in &to_remove {
            self.remove(id).await;
        }
    }

    /// Number of connected subscribers.
    pub fn connection_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn make_subscriber(id: &str) -> (Arc<Subscriber>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(32);
        (Arc::new(Subscriber::new(id.into(), tx)), rx)
    }

    fn parse(frame: &Arc<String>) -> serde_json::Value {
        serde_json::from_str(frame).unwrap()
    }

    #[tokio::test]
    async fn add_and_count() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.connection_count(), 0);
        let (sub, _rx) = make_subscriber("a");
        registry.add(sub).await;
        assert_eq!(registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn remove_subscriber() {
        let registry = SubscriberRegistry::new();
        let (sub, _rx) = make_subscriber("a");
        registry.add(sub).await;
        registry.remove("a").await;
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn remove_nonexistent_is_a_no_op() {
        let registry = SubscriberRegistry::new();
        registry.remove("no_such").await;
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn remove_cancels_heartbeat() {
        let registry = SubscriberRegistry::new();
        let (sub, _rx) = make_subscriber("a");
        let token = CancellationToken::new();
        sub.set_heartbeat(token.clone());
        registry.add(sub).await;

        registry.remove("a").await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let registry = SubscriberRegistry::new();
        let (a, mut rx_a) = make_subscriber("a");
        let (b, mut rx_b) = make_subscriber("b");
        registry.add(a).await;
        registry.add(b).await;

        registry
            .broadcast(&StatusEvent::Logout("NAVIGATION".into()))
            .await;

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = rx.try_recv().unwrap();
            let json = parse(&frame);
            assert_eq!(json["event"], "logout");
            assert_eq!(json["data"], "NAVIGATION");
        }
    }

    #[tokio::test]
    async fn broadcast_to_empty_registry_is_fine() {
        let registry = SubscriberRegistry::new();
        registry.broadcast(&StatusEvent::Message("x".into())).await;
    }

    #[tokio::test]
    async fn broadcast_serializes_once() {
        let registry = SubscriberRegistry::new();
        let (a, mut rx_a) = make_subscriber("a");
        let (b, mut rx_b) = make_subscriber("b");
        registry.add(a).await;
        registry.add(b).await;

        registry.broadcast(&StatusEvent::Message("shared".into())).await;

        let frame_a = rx_a.recv().await.unwrap();
        let frame_b = rx_b.recv().await.unwrap();
        assert!(Arc::ptr_eq(&frame_a, &frame_b));
    }

    #[tokio::test]
    async fn cancel_heartbeats_hits_all_subscribers() {
        let registry = SubscriberRegistry::new();
        let (a, _rx_a) = make_subscriber("a");
        let (b, _rx_b) = make_subscriber("b");
        let token_a = CancellationToken::new();
        let token_b = CancellationToken::new();
        a.set_heartbeat(token_a.clone());
        b.set_heartbeat(token_b.clone());
        registry.add(a).await;
        registry.add(b).await;

        registry.cancel_heartbeats().await;
        assert!(token_a.is_cancelled());
        assert!(token_b.is_cancelled());
    }

    #[tokio::test]
    async fn slow_subscriber_evicted_after_threshold() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        let slow = Arc::new(Subscriber::new("slow".into(), tx));
        let (fast, mut fast_rx) = make_subscriber("fast");
        registry.add(slow).await;
        registry.add(fast).await;

        let event = StatusEvent::Message("tick".into());
        // First broadcast fills the slow channel, then exceed the threshold.
        for _ in 0..=MAX_TOTAL_DROPS {
            registry.broadcast(&event).await;
        }

        assert_eq!(registry.connection_count(), 1);
        assert!(fast_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn fast_subscriber_stays_connected() {
        let registry = SubscriberRegistry::new();
        let (fast, mut rx) = make_subscriber("fast");
        registry.add(fast).await;

        for _ in 0..20 {
            registry.broadcast(&StatusEvent::Message("tick".into())).await;
            while rx.try_recv().is_ok() {}
        }
        assert_eq!(registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn add_same_id_overwrites_without_double_count() {
        let registry = SubscriberRegistry::new();
        let (a1, _rx1) = make_subscriber("same");
        let (a2, _rx2) = make_subscriber("same");
        registry.add(a1).await;
        registry.add(a2).await;
        assert_eq!(registry.connection_count(), 1);
    }
}
