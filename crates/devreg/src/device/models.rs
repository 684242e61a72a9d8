//! Device data models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Client-settable device fields, in canonical order.
pub const DEVICE_FIELDS: [&str; 5] = ["name", "location", "type", "model", "serial_number"];

/// Fields a partial update may touch.
pub const PATCHABLE_FIELDS: [&str; 2] = ["name", "location"];

/// A stored device.
///
/// Serializes to exactly seven keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub device_type: String,
    pub model: String,
    pub serial_number: String,
    pub owner: String,
}

impl Device {
    /// The client-settable part of this device.
    pub fn fields(&self) -> DeviceFields {
        DeviceFields {
            name: self.name.clone(),
            location: self.location.clone(),
            device_type: self.device_type.clone(),
            model: self.model.clone(),
            serial_number: self.serial_number.clone(),
        }
    }
}

/// A complete set of client-settable fields (create/replace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFields {
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub model: String,
    pub serial_number: String,
}

/// A partial update; at least one field is set once validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl DevicePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none()
    }
}

/// Equality filters for listing devices. Owner scoping is applied separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceListQuery {
    /// Raw `id` parameter; a value that is not an integer matches nothing.
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub device_type: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceListQuery {
    /// Build from query parameters. Empty values and unknown keys are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            id: get("id"),
            name: get("name"),
            location: get("location"),
            device_type: get("type"),
            model: get("model"),
            serial_number: get("serial_number"),
        }
    }

    /// Column/value pairs for the string-valued filters that are set.
    pub fn text_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("location", &self.location),
            ("type", &self.device_type),
            ("model", &self.model),
            ("serial_number", &self.serial_number),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }
}

/// Response body for `GET /devices/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thermostat() -> Device {
        Device {
            id: 7,
            name: "Main Thermostat".to_string(),
            location: "Living Room".to_string(),
            device_type: "Thermostat".to_string(),
            model: "ThermoBest 3G".to_string(),
            serial_number: "TB3G-12345".to_string(),
            owner: "alice".to_string(),
        }
    }

    #[test]
    fn test_device_json_shape() {
        let json = serde_json::to_value(thermostat()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "Thermostat");
        assert_eq!(json["owner"], "alice");
        assert!(obj.get("device_type").is_none());
    }

    #[test]
    fn test_list_query_from_params() {
        let params: HashMap<String, String> = [
            ("name", "Main Thermostat"),
            ("location", ""),
            ("type", "Thermostat"),
            ("owner", "mallory"),
            ("id", "12"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let query = DeviceListQuery::from_params(&params);
        assert_eq!(query.id.as_deref(), Some("12"));
        assert_eq!(query.location, None);
        assert_eq!(
            query.text_filters(),
            vec![("name", "Main Thermostat"), ("type", "Thermostat")]
        );
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(DevicePatch::default().is_empty());
        let patch = DevicePatch {
            name: Some("x".to_string()),
            location: None,
        };
        assert!(!patch.is_empty());
    }
}
