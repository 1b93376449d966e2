//! WebSocket session lifecycle — handles a single subscriber from upgrade
//! through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::server::AppState;

use super::events::StatusEvent;
use super::heartbeat::run_heartbeat;
use super::subscriber::Subscriber;

/// Interval between server-initiated Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Outbound frame buffer per subscriber.
const SEND_BUFFER: usize = 256;

/// Run a WebSocket session for a connected subscriber.
///
/// 1. Registers the subscriber for status broadcasts
/// 2. Live session ⇒ immediate `ready` notification; otherwise starts the
///    per-subscriber "connecting" heartbeat
/// 3. Forwards outbound frames and periodic protocol Pings
/// 4. Drains inbound frames (there are no client→server events) until close
/// 5. Cleans up: cancels the heartbeat, unregisters
pub async fn run_ws_session(ws: WebSocket, state: AppState) {
    let id = format!("sub_{}", Uuid::now_v7().simple());
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(SEND_BUFFER);
    let subscriber = Arc::new(Subscriber::new(id.clone(), send_tx));

    info!(id, status = %state.session.status(), "subscriber connected");
    state.subscribers.add(subscriber.clone()).await;

    if state.session.is_ready() {
        let _ = subscriber.send_event(&StatusEvent::Ready(state.config.ready_asset.clone()));
    } else {
        let token = state.shutdown.token().child_token();
        subscriber.set_heartbeat(token.clone());
        let hb_subscriber = subscriber.clone();
        let hb_session = state.session.clone();
        let interval = Duration::from_millis(state.config.heartbeat_interval_ms);
        drop(tokio::spawn(async move {
            let _ = run_heartbeat(hb_subscriber, hb_session, interval, token).await;
        }));
    }

    // Outbound forwarder with periodic Ping frames.
    let outbound = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_INTERVAL);
        // Skip the immediate first tick.
        let _ = ping.tick().await;
        loop {
            tokio::select! {
                frame = send_rx.recv() => {
                    match frame {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Inbound loop: drain until the peer closes or errors.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(Message::Text(text)) => {
                debug!(id, len = text.len(), "ignoring client frame");
            }
            Ok(_) => {}
        }
    }

    subscriber.cancel_heartbeat();
    state.subscribers.remove(&id).await;
    outbound.abort();
    info!(
        id,
        age_secs = subscriber.connected_at.elapsed().as_secs(),
        "subscriber disconnected"
    );
}
