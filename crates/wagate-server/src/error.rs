//! HTTP error taxonomy and wire envelopes.
//!
//! Every failure is scoped to a single request; nothing here is fatal to
//! the process. The envelope shapes (and their status codes) are part of
//! the public API contract:
//!
//! | Error | Status | Body |
//! |-------|--------|------|
//! | `Offline` | 404 | `{status:false, message:{message:"…offline…"}}` |
//! | `Validation` | 422 | `{status:false, message:{<field>:<msg>,…}}` |
//! | `NotRegistered` | 422 | `{status:false, message:{message:"…not registered…"}}` |
//! | `Provider` | 500 | `{status:false, response:<opaque payload>}` |

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Message used by field-presence validation failures.
pub const INVALID_VALUE: &str = "Invalid value";

/// A request-scoped API failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session is not ready; the caller should retry after pairing.
    #[error("WhatsApp is offline, please contact Admin")]
    Offline,

    /// Required fields missing or unusable; one entry per failing field.
    #[error("validation failed")]
    Validation {
        /// Field name → message.
        fields: BTreeMap<String, String>,
    },

    /// The destination is not a registered user of the network.
    #[error("Number is not registered on WhatsApp")]
    NotRegistered,

    /// The external client failed; its payload is forwarded unmodified.
    #[error("provider request failed")]
    Provider {
        /// Opaque provider error payload.
        payload: serde_json::Value,
    },
}

impl ApiError {
    /// Build a validation error for a single field.
    pub fn invalid_field(field: &str) -> Self {
        let mut fields = BTreeMap::new();
        let _ = fields.insert(field.to_string(), INVALID_VALUE.to_string());
        Self::Validation { fields }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Offline => (
                StatusCode::NOT_FOUND,
                json!({
                    "status": false,
                    "message": { "message": "WhatsApp is offline, please contact Admin" },
                }),
            ),
            Self::Validation { fields } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "status": false, "message": fields }),
            ),
            Self::NotRegistered => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "status": false,
                    "message": { "message": "Number is not registered on WhatsApp" },
                }),
            ),
            Self::Provider { payload } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "status": false, "response": payload }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn offline_envelope() {
        let (status, body) = render(ApiError::Offline).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], false);
        assert_eq!(
            body["message"]["message"],
            "WhatsApp is offline, please contact Admin"
        );
    }

    #[tokio::test]
    async fn validation_envelope_keyed_per_field() {
        let mut fields = BTreeMap::new();
        let _ = fields.insert("number".to_string(), INVALID_VALUE.to_string());
        let _ = fields.insert("message".to_string(), INVALID_VALUE.to_string());
        let (status, body) = render(ApiError::Validation { fields }).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"]["number"], INVALID_VALUE);
        assert_eq!(body["message"]["message"], INVALID_VALUE);
    }

    #[tokio::test]
    async fn not_registered_envelope() {
        let (status, body) = render(ApiError::NotRegistered).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["message"]["message"],
            "Number is not registered on WhatsApp"
        );
    }

    #[tokio::test]
    async fn provider_envelope_carries_payload_unmodified() {
        let payload = json!({"stack": ["a", "b"], "reason": "boom"});
        let (status, body) = render(ApiError::Provider {
            payload: payload.clone(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], false);
        assert_eq!(body["response"], payload);
    }

    #[test]
    fn invalid_field_helper() {
        let err = ApiError::invalid_field("number");
        match err {
            ApiError::Validation { fields } => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields["number"], INVALID_VALUE);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
