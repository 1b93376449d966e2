//! Server→client wire events.
//!
//! Serialized as `{"event": <name>, "data": <payload>}`. There are no
//! client→server events beyond connect/disconnect.

use serde::Serialize;

/// A status event pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum StatusEvent {
    /// Heartbeat while pairing is pending; human-readable "connecting" text.
    Loading(String),
    /// Pairing code as a PNG data URL.
    Qr(String),
    /// Human-readable status line.
    Message(String),
    /// The session is live; payload is the ready static-asset token.
    Ready(String),
    /// The session dropped; payload is the disconnect reason, verbatim.
    Logout(String),
}

impl StatusEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading(_) => "loading",
            Self::Qr(_) => "qr",
            Self::Message(_) => "message",
            Self::Ready(_) => "ready",
            Self::Logout(_) => "logout",
        }
    }
}

/// Heartbeat text for the `n`-th tick.
pub fn loading_message(n: u64) -> String {
    format!("Connecting, please wait....({n})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_event_plus_data() {
        let json = serde_json::to_value(StatusEvent::Message("QR Code scanned".into())).unwrap();
        assert_eq!(json["event"], "message");
        assert_eq!(json["data"], "QR Code scanned");
    }

    #[test]
    fn event_names_are_lowercase() {
        let cases = [
            (StatusEvent::Loading("x".into()), "loading"),
            (StatusEvent::Qr("x".into()), "qr"),
            (StatusEvent::Message("x".into()), "message"),
            (StatusEvent::Ready("x".into()), "ready"),
            (StatusEvent::Logout("x".into()), "logout"),
        ];
        for (event, name) in cases {
            assert_eq!(event.name(), name);
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], name);
        }
    }

    #[test]
    fn loading_message_embeds_counter() {
        assert_eq!(loading_message(1), "Connecting, please wait....(1)");
        assert_eq!(loading_message(42), "Connecting, please wait....(42)");
    }
}
