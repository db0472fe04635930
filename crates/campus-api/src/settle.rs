//! Deciding whether a call succeeded.

use campus_core::{ApiErrorEnvelope, UNEXPECTED_ERROR};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::transport::{ApiResponse, TransportError};
use crate::types::ApiEnvelope;

/// Returned when a read succeeds but carries no `data`.
pub const NO_DATA_MESSAGE: &str = "No data received from API";

/// Which success rule applies to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// Succeeds when the body says `success: true`.
    Read,
    /// Succeeds on HTTP 200 or 201.
    Mutation,
}

/// Maps a transport result onto the decoded envelope or a failure envelope.
///
/// - transport errors use the embedded body's message, or the fallback
/// - a rejected call yields `{message: body.message, error: body.errors ?? []}`
/// - a successful read without `data`, or an undecodable read body, is
///   treated as a transport failure
/// - an accepted mutation always succeeds; a body that does not decode keeps
///   its `message` and loses its `data`
pub fn settle<T: DeserializeOwned>(
    class: OpClass,
    result: Result<ApiResponse, TransportError>,
) -> Result<ApiEnvelope<T>, ApiErrorEnvelope> {
    let response = result.map_err(|err| err.to_envelope())?;

    let accepted = match class {
        OpClass::Mutation => matches!(response.status, 200 | 201),
        OpClass::Read => response.body.get("success").and_then(Value::as_bool) == Some(true),
    };
    if !accepted {
        return Err(ApiErrorEnvelope::from_body(&response.body));
    }

    match class {
        OpClass::Read => {
            let envelope: ApiEnvelope<T> = serde_json::from_value(response.body).map_err(|err| {
                tracing::warn!(error = %err, "response body did not match the expected shape");
                ApiErrorEnvelope::new(UNEXPECTED_ERROR)
            })?;
            if envelope.data.is_none() {
                return Err(ApiErrorEnvelope::new(NO_DATA_MESSAGE));
            }
            Ok(envelope)
        }
        // The status alone decides a mutation; a body we cannot decode only
        // loses its `data`.
        OpClass::Mutation => Ok(serde_json::from_value(response.body.clone()).unwrap_or_else(|err| {
            tracing::debug!(error = %err, status = response.status, "mutation body kept without data");
            bare_envelope(&response.body)
        })),
    }
}

/// Everything but `data` from a body that did not decode as `ApiEnvelope<T>`.
fn bare_envelope<T>(body: &Value) -> ApiEnvelope<T> {
    ApiEnvelope {
        success: body.get("success").and_then(Value::as_bool),
        data: None,
        message: body.get("message").and_then(Value::as_str).map(str::to_owned),
        errors: body.get("errors").and_then(Value::as_array).cloned(),
        status_code: body
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok()),
    }
}
