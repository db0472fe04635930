//! Failure shapes shared by sagas and reducers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure carries no usable text of its own.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Stored in state when a failure payload has no message at all.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Normalized failure shape built by sagas from any caught error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub message: Option<String>,
    #[serde(default)]
    pub error: Vec<Value>,
}

impl ApiErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: Vec::new(),
        }
    }

    /// The transport-failure fallback.
    pub fn unexpected() -> Self {
        Self::new(UNEXPECTED_ERROR)
    }

    /// Extracts `{message, errors}` from an application-level error body.
    ///
    /// The message is left empty when the body has none; the reducer decides
    /// what to store in that case.
    pub fn from_body(body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let error = body
            .get("errors")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Self { message, error }
    }

    /// Like [`from_body`](Self::from_body) but falls back to
    /// [`UNEXPECTED_ERROR`] when no message is present.
    pub fn from_body_or_unexpected(body: &Value) -> Self {
        let mut envelope = Self::from_body(body);
        if envelope.message.is_none() {
            envelope.message = Some(UNEXPECTED_ERROR.to_owned());
        }
        envelope
    }
}

/// Payload of a `Failure` phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailurePayload {
    Message(String),
    Envelope(ApiErrorEnvelope),
}

impl FailurePayload {
    /// Text stored in `AsyncState::error`. The detail list is never kept.
    pub fn message(&self) -> &str {
        match self {
            Self::Message(message) => message,
            Self::Envelope(envelope) => envelope.message.as_deref().unwrap_or(UNKNOWN_ERROR),
        }
    }
}

impl From<String> for FailurePayload {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for FailurePayload {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<ApiErrorEnvelope> for FailurePayload {
    fn from(envelope: ApiErrorEnvelope) -> Self {
        Self::Envelope(envelope)
    }
}

/// Errors raised by the engine itself, never by sagas.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is not running")]
    Stopped,

    #[error("saga `{saga}` panicked: {message}")]
    SagaPanicked { saga: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_extracts_message_and_errors() {
        let body = json!({ "message": "Validation failed", "errors": [{ "field": "name" }] });
        let envelope = ApiErrorEnvelope::from_body(&body);

        assert_eq!(envelope.message.as_deref(), Some("Validation failed"));
        assert_eq!(envelope.error, vec![json!({ "field": "name" })]);
    }

    #[test]
    fn test_from_body_without_errors_yields_empty_list() {
        let envelope = ApiErrorEnvelope::from_body(&json!({ "message": "nope" }));
        assert!(envelope.error.is_empty());
    }

    #[test]
    fn test_missing_message_defaults() {
        let payload = FailurePayload::Envelope(ApiErrorEnvelope::default());
        assert_eq!(payload.message(), UNKNOWN_ERROR);

        let envelope = ApiErrorEnvelope::from_body_or_unexpected(&json!({}));
        assert_eq!(envelope.message.as_deref(), Some(UNEXPECTED_ERROR));
    }
}
