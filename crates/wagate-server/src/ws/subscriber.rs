//! Per-connection subscriber state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::events::StatusEvent;

/// A connected status subscriber.
///
/// Owns at most one heartbeat token, exclusively: installing a new one
/// cancels the previous, and both connection teardown and lifecycle
/// transitions cancel through here, so a repeating timer can never outlive
/// its subscriber.
pub struct Subscriber {
    /// Unique connection ID.
    pub id: String,
    /// Send channel to the connection's WebSocket write task.
    tx: mpsc::Sender<Arc<String>>,
    /// When this subscriber connected.
    pub connected_at: Instant,
    /// Count of messages dropped due to a full channel.
    dropped_messages: AtomicU64,
    /// Heartbeat cancellation token, if a heartbeat is running.
    heartbeat: Mutex<Option<CancellationToken>>,
}

impl Subscriber {
    /// Create a new subscriber.
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            connected_at: Instant::now(),
            dropped_messages: AtomicU64::new(0),
            heartbeat: Mutex::new(None),
        }
    }

    /// Send a pre-serialized frame.
    ///
    /// Returns `false` if the channel is full or closed, and increments the
    /// dropped message counter.
    pub fn send(&self, frame: Arc<String>) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Serialize and send a status event.
    pub fn send_event(&self, event: &StatusEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(json) => self.send(Arc::new(json)),
            Err(_) => false,
        }
    }

    /// Total messages dropped for this subscriber.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Install a heartbeat token, cancelling any previous one.
    pub fn set_heartbeat(&self, token: CancellationToken) {
        if let Some(previous) = self.heartbeat.lock().replace(token) {
            previous.cancel();
        }
    }

    /// Cancel the running heartbeat, if any.
    pub fn cancel_heartbeat(&self) {
        if let Some(token) = self.heartbeat.lock().take() {
            token.cancel();
        }
    }

    /// Whether a heartbeat token is currently installed.
    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.lock().is_some()
    }
}
