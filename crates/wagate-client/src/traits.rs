//! The `MessagingClient` capability trait.

use async_trait::async_trait;
use tokio::sync::broadcast;
use wagate_core::{Address, LifecycleEvent};

use crate::types::{BatteryInfo, ClientError, ClientInfo};

/// Capability surface of the external messaging client.
///
/// Lifecycle events arrive on a broadcast channel; the gateway's lifecycle
/// bridge subscribes once for the process lifetime. Capability methods are
/// async and may suspend for as long as the underlying automation takes —
/// callers must not hold locks across them.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Subscribe to lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent>;

    /// Whether `address` belongs to a registered user of the network.
    async fn is_registered_user(&self, address: &Address) -> Result<bool, ClientError>;

    /// Send a text message. Returns the provider's response payload, opaque.
    ///
    /// Exactly one network send attempt; the client does not retry.
    async fn send_message(
        &self,
        address: &Address,
        body: &str,
    ) -> Result<serde_json::Value, ClientError>;

    /// Session identity of the paired account.
    async fn client_info(&self) -> Result<ClientInfo, ClientError>;

    /// Battery state of the paired device.
    async fn battery_status(&self) -> Result<BatteryInfo, ClientError>;
}
