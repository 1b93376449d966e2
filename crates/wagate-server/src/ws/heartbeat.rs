//! Per-subscriber "connecting" heartbeat.
//!
//! While pairing is pending, each subscriber gets its own repeating ticker
//! that increments the shared session counter and pushes a `loading` event.
//! The ticker runs until its token is cancelled — by a lifecycle transition,
//! by subscriber teardown, or by server shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use wagate_core::SharedSession;

use super::events::{StatusEvent, loading_message};
use super::subscriber::Subscriber;

/// Outcome of the heartbeat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The heartbeat was cancelled.
    Cancelled,
}

/// Run the heartbeat for one subscriber until cancelled.
///
/// The first tick fires after one full `interval` (the subscriber just
/// connected; there is nothing to report yet). Each tick increments the
/// process-wide counter, so concurrent subscribers interleave counter
/// values while receiving independent streams.
pub async fn run_heartbeat(
    subscriber: Arc<Subscriber>,
    session: Arc<SharedSession>,
    interval: Duration,
    cancel: CancellationToken,
) -> HeartbeatResult {
    let mut tick = time::interval(interval);
    // Skip the immediate first tick.
    let _ = tick.tick().await;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let n = session.next_heartbeat();
                let event = StatusEvent::Loading(loading_message(n));
                if !subscriber.send_event(&event) {
                    tracing::debug!(id = %subscriber.id, n, "heartbeat frame dropped");
                }
            }
            () = cancel.cancelled() => {
                return HeartbeatResult::Cancelled;
            }
        }
    }
}
