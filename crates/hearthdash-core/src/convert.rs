// ── API ↔ domain conversions ──

use hearthdash_api::{ApiColor, ApiDevice, DeviceCommandBody};

use crate::command::DeviceCommand;
use crate::model::{Device, DeviceId, Rgb};

impl From<ApiDevice> for Device {
    fn from(d: ApiDevice) -> Self {
        Self {
            id: DeviceId::from(d.id),
            label: d.label,
            kind: d.kind,
            value: d.value,
            is_active: d.is_active,
        }
    }
}

impl From<Rgb> for ApiColor {
    fn from(c: Rgb) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

impl From<ApiColor> for Rgb {
    fn from(c: ApiColor) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

impl DeviceCommand {
    /// Split into the target id and the wire body.
    pub(crate) fn into_request(self) -> (DeviceId, DeviceCommandBody) {
        match self {
            Self::SetState { device_id, state } => {
                (device_id, DeviceCommandBody::State(state.to_string()))
            }
            Self::SetColor { device_id, color } => {
                (device_id, DeviceCommandBody::Color(color.into()))
            }
            Self::SetLevel { device_id, level } => (device_id, DeviceCommandBody::Level(level)),
        }
    }
}
