//! `POST /send-message` — the request gate and send pipeline.

use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Value, json};
use wagate_core::normalize;

use crate::error::{ApiError, INVALID_VALUE};
use crate::server::AppState;

/// Handle a message send.
///
/// Order matters: the readiness gate runs before the body is even parsed,
/// so while the session is offline every request — however malformed — gets
/// the offline envelope. After the gate: validate field presence, normalize
/// the destination, confirm registration, forward the send. Exactly one
/// send attempt per accepted request; provider failures are not retried.
pub async fn send_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !state.session.is_ready() {
        return Err(ApiError::Offline);
    }

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let number = body.get("number").and_then(Value::as_str).unwrap_or_default();
    let message = body.get("message").and_then(Value::as_str).unwrap_or_default();

    let mut fields = BTreeMap::new();
    if number.trim().is_empty() {
        let _ = fields.insert("number".to_string(), INVALID_VALUE.to_string());
    }
    if message.trim().is_empty() {
        let _ = fields.insert("message".to_string(), INVALID_VALUE.to_string());
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation { fields });
    }

    let address = normalize(number, &state.config.country_code)
        .map_err(|_| ApiError::invalid_field("number"))?;

    // The readiness check above and the client calls below are separated by
    // await points; a disconnect arriving in between leaves the in-flight
    // send to fail at the provider.
    let registered = state
        .client
        .is_registered_user(&address)
        .await
        .map_err(|e| ApiError::Provider {
            payload: e.wire_payload(),
        })?;
    if !registered {
        return Err(ApiError::NotRegistered);
    }

    match state.client.send_message(&address, message).await {
        Ok(payload) => Ok(Json(json!({ "status": true, "response": payload }))),
        Err(e) => Err(ApiError::Provider {
            payload: e.wire_payload(),
        }),
    }
}
