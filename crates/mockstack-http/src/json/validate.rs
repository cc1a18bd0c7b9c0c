//! Request body parsing and required-field validation.

use mockstack_core::{ServiceError, missing_field_message};
use serde_json::{Map, Value};

/// Parse a JSON request body into an object. An empty body is `{}`.
pub fn parse_object<E: ServiceError>(body: &[u8]) -> Result<Map<String, Value>, E> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| E::serialization(format!("Failed to parse request body as JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(E::validation(format!(
            "Request body must be a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Check that every required field is present, non-null and non-empty.
pub fn validate_required<E: ServiceError>(
    object: &Map<String, Value>,
    fields: &[&str],
) -> Result<(), E> {
    for field in fields {
        let missing = object.get(*field).is_none_or(is_empty_value);
        if missing {
            return Err(E::validation(missing_field_message(field)));
        }
    }
    Ok(())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Deserialize a typed input from a validated JSON body.
pub fn decode_input<T, E>(body: &[u8]) -> Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: ServiceError,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"{}")
            .map_err(|e| E::serialization(format!("Failed to deserialize request body: {e}")));
    }
    serde_json::from_slice(body)
        .map_err(|e| E::serialization(format!("Failed to deserialize request body: {e}")))
}

/// Serialize a typed output into JSON bytes.
pub fn encode_output<T, E>(output: &T) -> Result<Vec<u8>, E>
where
    T: serde::Serialize,
    E: ServiceError,
{
    serde_json::to_vec(output)
        .map_err(|e| E::internal_error(format!("Failed to serialize response: {e}")))
}
