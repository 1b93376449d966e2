//! `/health` endpoint.

use std::time::Instant;

use serde::Serialize;
use wagate_core::SessionStatus;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Current WebSocket subscriber count.
    pub connections: usize,
    /// Current session status.
    pub session: SessionStatus,
}

/// Build a health response from live counters.
pub fn health_check(
    start_time: Instant,
    connections: usize,
    session: SessionStatus,
) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
        session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        let resp = health_check(Instant::now(), 0, SessionStatus::Idle);
        assert_eq!(resp.status, "ok");
    }

    #[test]
    fn uptime_increases() {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(60))
            .unwrap();
        let resp = health_check(start, 0, SessionStatus::Idle);
        assert!(resp.uptime_secs >= 59);
    }

    #[test]
    fn serialization() {
        let resp = health_check(Instant::now(), 2, SessionStatus::AwaitingScan);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["connections"], 2);
        assert_eq!(json["session"], "awaiting_scan");
        assert!(json["uptime_secs"].is_number());
    }

    #[test]
    fn session_status_tracked() {
        let resp = health_check(Instant::now(), 0, SessionStatus::Ready);
        assert_eq!(resp.session, SessionStatus::Ready);
    }
}
