//! Structural validation of device payloads.
//!
//! Only field names are checked. Both modes reject anything unexpected.

use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{DEVICE_FIELDS, DeviceFields, DevicePatch, PATCHABLE_FIELDS};

/// A JSON object payload.
pub type Payload = Map<String, Value>;

/// Validation failures. The display text is the client-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The request body must be a JSON object")]
    NotAnObject,

    #[error("The device is missing all data")]
    EmptyDevice,

    #[error("{}", describe_device_fields(.missing, .invalid))]
    DeviceFields {
        missing: Vec<String>,
        invalid: Vec<String>,
    },

    #[error("The request is missing all data")]
    EmptyPatch,

    #[error("Invalid fields: {}", .invalid.join(", "))]
    PatchFields { invalid: Vec<String> },
}

fn describe_device_fields(missing: &[String], invalid: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!(
            "The device has missing fields: {}",
            missing.join(", ")
        ));
    }
    if !invalid.is_empty() {
        parts.push(format!(
            "The device has invalid fields: {}",
            invalid.join(", ")
        ));
    }
    parts.join("; ")
}

/// Parse a raw request body.
///
/// An empty body and JSON `null` both yield an empty payload.
pub fn parse_payload(body: &[u8]) -> Result<Payload, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Payload::new()),
        _ => Err(ValidationError::NotAnObject),
    }
}

/// Full validation for create/replace: exactly the fixed field set.
///
/// Missing and unexpected fields are reported together.
pub fn validate_full(payload: &Payload) -> Result<DeviceFields, ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::EmptyDevice);
    }

    let missing: Vec<String> = DEVICE_FIELDS
        .iter()
        .filter(|field| !payload.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    let invalid: Vec<String> = payload
        .keys()
        .filter(|key| !DEVICE_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect();

    if !missing.is_empty() || !invalid.is_empty() {
        return Err(ValidationError::DeviceFields { missing, invalid });
    }

    let value = |field: &str| payload.get(field).map(field_text).unwrap_or_default();

    Ok(DeviceFields {
        name: value("name"),
        location: value("location"),
        device_type: value("type"),
        model: value("model"),
        serial_number: value("serial_number"),
    })
}

/// Partial validation for patch: only `name` and/or `location`.
pub fn validate_partial(payload: &Payload) -> Result<DevicePatch, ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }

    let invalid: Vec<String> = payload
        .keys()
        .filter(|key| !PATCHABLE_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect();

    if !invalid.is_empty() {
        return Err(ValidationError::PatchFields { invalid });
    }

    Ok(DevicePatch {
        name: payload.get("name").map(field_text),
        location: payload.get("location").map(field_text),
    })
}

/// Stored text for a field value: strings as-is, anything else as compact JSON.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
