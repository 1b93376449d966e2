//! In-process simulated client.
//!
//! Implements [`MessagingClient`] without any network or browser automation:
//! lifecycle events are emitted by the caller via [`SimulatedClient::emit`],
//! registration lookups answer from a seeded set, and sends are recorded and
//! answered with a canned provider payload. The daemon runs on this double
//! (the real protocol is out of scope); server tests script it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;
use wagate_core::{Address, LifecycleEvent};

use crate::traits::MessagingClient;
use crate::types::{BatteryInfo, ClientError, ClientInfo};

/// Capacity of the lifecycle event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Scriptable in-process [`MessagingClient`].
pub struct SimulatedClient {
    events: broadcast::Sender<LifecycleEvent>,
    registered: Mutex<HashSet<Address>>,
    lookups: Mutex<Vec<Address>>,
    sent: Mutex<Vec<(Address, String)>>,
    next_send_failure: Mutex<Option<serde_json::Value>>,
    info: Mutex<ClientInfo>,
    battery: Mutex<BatteryInfo>,
    send_seq: AtomicU64,
}

impl SimulatedClient {
    /// Create a simulated client with no registered users.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            events,
            registered: Mutex::new(HashSet::new()),
            lookups: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            next_send_failure: Mutex::new(None),
            info: Mutex::new(ClientInfo {
                pushname: "Simulated".into(),
                jid: "6280000000000@c.us".into(),
                platform: "wagate-sim".into(),
            }),
            battery: Mutex::new(BatteryInfo {
                battery: 100,
                plugged: true,
            }),
            send_seq: AtomicU64::new(0),
        }
    }

    /// Seed a registered user.
    pub fn register(&self, address: Address) {
        let _ = self.registered.lock().insert(address);
    }

    /// Emit a lifecycle event to all subscribers.
    ///
    /// Returns the number of subscribers that received it (0 if nobody is
    /// listening yet — the event is simply lost, as with a real client).
    pub fn emit(&self, event: LifecycleEvent) -> usize {
        debug!(kind = event.kind(), "emitting lifecycle event");
        self.events.send(event).unwrap_or(0)
    }

    /// Script the next `send_message` call to fail with `payload`.
    pub fn fail_next_send(&self, payload: serde_json::Value) {
        *self.next_send_failure.lock() = Some(payload);
    }

    /// Replace the reported session identity.
    pub fn set_info(&self, info: ClientInfo) {
        *self.info.lock() = info;
    }

    /// Replace the reported battery state.
    pub fn set_battery(&self, battery: BatteryInfo) {
        *self.battery.lock() = battery;
    }

    /// Addresses passed to `is_registered_user`, in call order.
    pub fn recorded_lookups(&self) -> Vec<Address> {
        self.lookups.lock().clone()
    }

    /// `(address, body)` pairs passed to `send_message`, in call order.
    pub fn recorded_sends(&self) -> Vec<(Address, String)> {
        self.sent.lock().clone()
    }
}

impl Default for SimulatedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingClient for SimulatedClient {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    async fn is_registered_user(&self, address: &Address) -> Result<bool, ClientError> {
        self.lookups.lock().push(address.clone());
        Ok(self.registered.lock().contains(address))
    }

    async fn send_message(
        &self,
        address: &Address,
        body: &str,
    ) -> Result<serde_json::Value, ClientError> {
        self.sent.lock().push((address.clone(), body.to_string()));

        if let Some(payload) = self.next_send_failure.lock().take() {
            return Err(ClientError::Provider { payload });
        }

        let seq = self.send_seq.fetch_add(1, Ordering::Relaxed);
        Ok(json!({
            "id": {
                "fromMe": true,
                "remote": address.as_str(),
                "_serialized": format!("true_{}_{seq}", address.as_str()),
            },
            "ack": 0,
            "to": address.as_str(),
            "body": body,
        }))
    }

    async fn client_info(&self) -> Result<ClientInfo, ClientError> {
        Ok(self.info.lock().clone())
    }

    async fn battery_status(&self) -> Result<BatteryInfo, ClientError> {
        Ok(*self.battery.lock())
    }
}
