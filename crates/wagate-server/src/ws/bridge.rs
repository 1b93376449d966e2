//! Lifecycle bridge — translates the external client's events into session
//! transitions and status broadcasts.
//!
//! Subscribes once for the process lifetime. No retry, no backoff: if the
//! external client goes silent, the gateway stays in its current state
//! indefinitely.

use std::sync::Arc;

use tokio::sync::broadcast;
use wagate_core::{LifecycleEvent, SharedSession};

use crate::qr;

use super::events::StatusEvent;
use super::registry::SubscriberRegistry;

/// Bridges client lifecycle events to status subscribers.
pub struct LifecycleBridge {
    rx: broadcast::Receiver<LifecycleEvent>,
    session: Arc<SharedSession>,
    subscribers: Arc<SubscriberRegistry>,
    ready_asset: String,
}

impl LifecycleBridge {
    /// Create a new bridge over an event subscription.
    pub fn new(
        rx: broadcast::Receiver<LifecycleEvent>,
        session: Arc<SharedSession>,
        subscribers: Arc<SubscriberRegistry>,
        ready_asset: String,
    ) -> Self {
        Self {
            rx,
            session,
            subscribers,
            ready_asset,
        }
    }

    /// Run the bridge loop. Exits when the client's event sender is dropped.
    #[tracing::instrument(skip_all, name = "lifecycle_bridge")]
    pub async fn run(mut self) {
        loop {
            match self.rx.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "lifecycle bridge lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("lifecycle bridge: client event sender closed, exiting");
                    break;
                }
            }
        }
    }

    /// Apply one lifecycle event and broadcast the outcome.
    ///
    /// Re-fired events leave the status untouched but still re-broadcast the
    /// corresponding message — the client is the source of truth.
    pub async fn handle_event(&self, event: LifecycleEvent) {
        let transition = self.session.apply(&event);
        tracing::info!(
            kind = event.kind(),
            prior = %transition.prior,
            status = %transition.status,
            changed = transition.changed,
            "lifecycle event"
        );

        match event {
            LifecycleEvent::QrIssued { code } => {
                self.subscribers.cancel_heartbeats().await;
                match qr::encode_data_url(&code) {
                    Ok(url) => {
                        self.subscribers.broadcast(&StatusEvent::Qr(url)).await;
                        self.subscribers
                            .broadcast(&StatusEvent::Message("QR ready, please scan it".into()))
                            .await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to render pairing code");
                    }
                }
            }
            LifecycleEvent::Authenticated => {
                self.subscribers.cancel_heartbeats().await;
                self.subscribers
                    .broadcast(&StatusEvent::Message("QR Code scanned".into()))
                    .await;
            }
            LifecycleEvent::Ready => {
                self.subscribers.cancel_heartbeats().await;
                self.subscribers
                    .broadcast(&StatusEvent::Message("WhatsApp is ready!".into()))
                    .await;
                self.subscribers
                    .broadcast(&StatusEvent::Ready(self.ready_asset.clone()))
                    .await;
            }
            LifecycleEvent::Disconnected { reason } => {
                self.subscribers
                    .broadcast(&StatusEvent::Logout(reason))
                    .await;
            }
        }
    }
}
