// Wire types for the device API.
//
// Devices come back as a bare JSON array. Ids and values are loosely typed
// upstream (strings or numbers), so both are normalized to strings here.

use serde::{Deserialize, Deserializer, Serialize};

/// A device as reported by `GET /devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDevice {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default)]
    pub is_active: bool,
}

/// RGB color as carried by the `color` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Body of `PATCH /devices/{id}`. Exactly one field is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCommandBody {
    /// `{"state": "On"}`
    State(String),
    /// `{"color": {"r": .., "g": .., "b": ..}}`
    Color(ApiColor),
    /// `{"level": 42}`
    Level(u8),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
