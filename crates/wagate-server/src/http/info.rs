//! `POST /info` — session info plus a logged-only battery lookup.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::server::AppState;

/// Report the client's session identity.
///
/// Gated by the same readiness check as message sends. Also kicks off a
/// fire-and-forget battery-status lookup whose result is only logged, never
/// returned.
pub async fn client_info(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if !state.session.is_ready() {
        return Err(ApiError::Offline);
    }

    let client = state.client.clone();
    drop(tokio::spawn(async move {
        match client.battery_status().await {
            Ok(battery) => {
                tracing::info!(
                    level = battery.battery,
                    plugged = battery.plugged,
                    "battery status"
                );
            }
            Err(e) => tracing::warn!(error = %e, "battery status lookup failed"),
        }
    }));

    match state.client.client_info().await {
        Ok(info) => Ok(Json(json!({ "status": true, "clientInfo": info }))),
        Err(e) => Err(ApiError::Provider {
            payload: e.wire_payload(),
        }),
    }
}
