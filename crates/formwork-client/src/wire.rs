//! The backend wire envelope.
//!
//! Reads and writes share one envelope. Outbound, the caller's payload is
//! JSON-encoded into a single `data` parameter: on the URL query string for
//! reads, nested one level down in the request body for writes. Inbound,
//! every response is a JSON object with a `status` field (a value that
//! case-insensitively starts with `error` signals a backend failure) and a
//! `data` field that is either already structured or itself a JSON-encoded
//! string needing one more decode. Anything without an object top level is
//! a protocol error.

use formwork_core::error::{FormworkError, FormworkResult};
use serde_json::Value;

/// Parameter and body key the payload travels under.
pub const DATA_KEY: &str = "data";

const STATUS_KEY: &str = "status";
const ERROR_PREFIX: &str = "error";

/// Builds the full read URL for an endpoint: the payload JSON-encoded into
/// a `data` query parameter.
pub fn read_url(endpoint: &str, payload: &Value) -> FormworkResult<String> {
    let encoded = serde_json::to_string(payload)?;
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(DATA_KEY, &encoded)
        .finish();
    Ok(format!("{endpoint}?{query}"))
}

/// Builds a write body: `{ "data": "<json-encoded payload>" }`.
pub fn write_body(payload: &Value) -> FormworkResult<String> {
    let encoded = serde_json::to_string(payload)?;
    Ok(serde_json::to_string(&serde_json::json!({ DATA_KEY: encoded }))?)
}

/// Decodes a response envelope down to its `data` value.
///
/// A string-typed `data` is decoded one more level; a missing `data` is
/// `Null`.
pub fn decode_envelope(body: &str) -> FormworkResult<Value> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| FormworkError::Protocol(format!("response is not valid JSON: {e}")))?;
    let Some(envelope) = parsed.as_object() else {
        return Err(FormworkError::Protocol(
            "response is not a JSON object".to_string(),
        ));
    };

    if let Some(status) = envelope.get(STATUS_KEY).and_then(Value::as_str) {
        if status.to_ascii_lowercase().starts_with(ERROR_PREFIX) {
            return Err(FormworkError::Backend(status.to_string()));
        }
    }

    match envelope.get(DATA_KEY) {
        Some(Value::String(inner)) => serde_json::from_str(inner)
            .map_err(|e| FormworkError::Protocol(format!("data payload is not valid JSON: {e}"))),
        Some(other) => Ok(other.clone()),
        None => Ok(Value::Null),
    }
}
