//! Session lifecycle state machine.
//!
//! Exactly one session exists per process: the pairing state of the external
//! messaging client. Lifecycle events reported by the client drive the
//! transitions; HTTP handlers and the status broadcaster only read the
//! current status. The external client is the source of truth and may
//! re-fire events, so an event arriving in an unexpected state is accepted
//! idempotently rather than treated as an error.

use parking_lot::Mutex;
use serde::Serialize;

/// Pairing status of the messaging client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Process started, no pairing code issued yet.
    Idle,
    /// A pairing code has been issued and is waiting to be scanned.
    AwaitingScan,
    /// The code was scanned; the client is finishing session setup.
    Authenticated,
    /// The client is paired and can send messages.
    Ready,
    /// The client dropped the session; a new pairing code re-enters
    /// `AwaitingScan`.
    Disconnected,
}

impl SessionStatus {
    /// Stable lowercase name, as reported by `/health`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingScan => "awaiting_scan",
            Self::Authenticated => "authenticated",
            Self::Ready => "ready",
            Self::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle event reported by the external messaging client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A pairing code was issued (or re-issued).
    QrIssued {
        /// Raw pairing code; opaque bytes supplied by the client.
        code: String,
    },
    /// The pairing code was scanned.
    Authenticated,
    /// The client finished session setup and can send messages.
    Ready,
    /// The client lost or dropped the session.
    Disconnected {
        /// Human-readable reason, forwarded to subscribers verbatim.
        reason: String,
    },
}

impl LifecycleEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QrIssued { .. } => "qr_issued",
            Self::Authenticated => "authenticated",
            Self::Ready => "ready",
            Self::Disconnected { .. } => "disconnected",
        }
    }
}

/// Outcome of applying a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status before the event.
    pub prior: SessionStatus,
    /// Status after the event.
    pub status: SessionStatus,
    /// Whether the status actually moved. A re-fired event leaves this
    /// `false`; the caller still re-broadcasts the corresponding message.
    pub changed: bool,
}

/// The session state proper: status plus the shared heartbeat counter.
#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    heartbeat_count: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            heartbeat_count: 0,
        }
    }

    fn apply(&mut self, event: &LifecycleEvent) -> Transition {
        use SessionStatus::{Authenticated, AwaitingScan, Disconnected, Idle, Ready};

        let prior = self.status;
        let next = match (prior, event) {
            (Idle | Disconnected, LifecycleEvent::QrIssued { .. }) => Some(AwaitingScan),
            (AwaitingScan, LifecycleEvent::Authenticated) => Some(Authenticated),
            (AwaitingScan | Authenticated, LifecycleEvent::Ready) => Some(Ready),
            (_, LifecycleEvent::Disconnected { .. }) if prior != Disconnected => {
                Some(Disconnected)
            }
            // Re-fired or out-of-order event: keep the current status.
            _ => None,
        };

        match next {
            Some(status) => {
                if status == AwaitingScan {
                    self.heartbeat_count = 0;
                }
                self.status = status;
                Transition {
                    prior,
                    status,
                    changed: true,
                }
            }
            None => Transition {
                prior,
                status: prior,
                changed: false,
            },
        }
    }
}

/// Process-wide handle to the single [`SessionState`].
///
/// Mutation is confined to the client-lifecycle bridge (`apply`) and the
/// per-subscriber heartbeat tick (`next_heartbeat`); everything else reads.
/// The lock is never held across an await point.
pub struct SharedSession {
    inner: Mutex<SessionState>,
}

impl SharedSession {
    /// Create a new session in [`SessionStatus::Idle`].
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionState::new()),
        }
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status
    }

    /// Whether message sends are currently admitted.
    pub fn is_ready(&self) -> bool {
        self.status() == SessionStatus::Ready
    }

    /// Apply a lifecycle event. Called only by the lifecycle bridge.
    pub fn apply(&self, event: &LifecycleEvent) -> Transition {
        self.inner.lock().apply(event)
    }

    /// Increment and return the shared heartbeat counter.
    pub fn next_heartbeat(&self) -> u64 {
        let mut state = self.inner.lock();
        state.heartbeat_count += 1;
        state.heartbeat_count
    }

    /// Current heartbeat counter value.
    pub fn heartbeat_count(&self) -> u64 {
        self.inner.lock().heartbeat_count
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new()
    }
}
