//! Value and error types crossing the client seam.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session identity reported by the client once paired.
///
/// The gateway treats this as opaque — it is serialized into the `/info`
/// response unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Display name of the paired account.
    pub pushname: String,
    /// Canonical address of the paired account.
    pub jid: String,
    /// Platform string reported by the client.
    pub platform: String,
}

/// Battery state of the paired device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryInfo {
    /// Charge percentage, 0–100.
    pub battery: u8,
    /// Whether the device is plugged in.
    pub plugged: bool,
}

/// Failure reported by the external messaging client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The provider rejected the operation. The payload is opaque and is
    /// returned to HTTP callers unmodified.
    #[error("provider rejected the request")]
    Provider {
        /// Raw provider error payload.
        payload: serde_json::Value,
    },

    /// The client has no live session.
    #[error("client is not connected")]
    NotConnected,

    /// The underlying transport failed.
    #[error("transport failure: {message}")]
    Transport {
        /// What broke.
        message: String,
    },
}

impl ClientError {
    /// Wire payload for the server-error envelope.
    ///
    /// Provider rejections pass through unmodified; other failures surface
    /// as their display string.
    pub fn wire_payload(&self) -> serde_json::Value {
        match self {
            Self::Provider { payload } => payload.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}
