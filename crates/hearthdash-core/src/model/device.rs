// ── Device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Identifier of a device as reported by the hub.
///
/// Opaque: only equality across fetches matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Binary switch state. The hub speaks these exact strings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A device in the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub label: String,
    /// Free-form kind tag from the hub (e.g. `"switch"`, `"dimmer"`).
    pub kind: String,
    /// Free-form state: `"On"`/`"Off"`, a numeric level, a hex color...
    pub value: String,
    pub is_active: bool,
}

impl Device {
    /// `value` read as a switch state, if it is exactly `"On"` or `"Off"`.
    pub fn switch_state(&self) -> Option<SwitchState> {
        self.value.parse().ok()
    }

    pub fn is_on(&self) -> bool {
        self.switch_state() == Some(SwitchState::On)
    }

    /// `value` read as a number (dimmer level, counter, temperature).
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }

    /// `value` read as a hex color, for color-capable devices.
    pub fn color(&self) -> Option<Rgb> {
        self.value.parse().ok()
    }
}
