// ── Widget descriptors ──
//
// A descriptor is the serializable record of one widget: what it shows,
// which device it is bound to, where it sits on the grid, and its
// type-specific settings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::device::DeviceId;

// ── Identity ────────────────────────────────────────────────────────

/// Stable widget identity, independent of the widget's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(Uuid);

impl WidgetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Kind ────────────────────────────────────────────────────────────

/// Widget type tag.
///
/// Unrecognized tags are kept verbatim in [`WidgetKind::Other`] so a
/// layout written by a newer build survives a load/save round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    Clock,
    Switch,
    BinaryState,
    Climate,
    Color,
    Counter,
    Dimmer,
    Other(String),
}

impl WidgetKind {
    /// Every known kind, in the order the add-widget picker lists them.
    pub const KNOWN: [WidgetKind; 7] = [
        Self::Clock,
        Self::Switch,
        Self::Dimmer,
        Self::Color,
        Self::BinaryState,
        Self::Climate,
        Self::Counter,
    ];

    pub fn tag(&self) -> &str {
        match self {
            Self::Clock => "clock",
            Self::Switch => "switch",
            Self::BinaryState => "binaryState",
            Self::Climate => "climate",
            Self::Color => "color",
            Self::Counter => "counter",
            Self::Dimmer => "dimmer",
            Self::Other(tag) => tag,
        }
    }

    /// Whether the widget needs a bound device to render anything.
    pub fn requires_device(&self) -> bool {
        !matches!(self, Self::Clock)
    }

    /// Default footprint (w, h) for a freshly added widget.
    pub fn default_size(&self) -> (u16, u16) {
        match self {
            Self::Clock | Self::Climate => (4, 2),
            Self::Dimmer => (4, 1),
            _ => (2, 2),
        }
    }
}

impl From<String> for WidgetKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "clock" => Self::Clock,
            "switch" => Self::Switch,
            "binaryState" => Self::BinaryState,
            "climate" => Self::Climate,
            "color" => Self::Color,
            "counter" => Self::Counter,
            "dimmer" => Self::Dimmer,
            _ => Self::Other(tag),
        }
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Other(tag) => tag,
            known => known.tag().to_owned(),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Layout ──────────────────────────────────────────────────────────

/// Grid rectangle in column/row units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl LayoutRect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// First row below this rectangle.
    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }
}

// ── Style / config ──────────────────────────────────────────────────

/// Free-form presentation hints (e.g. `accent = "#ff6600"`).
pub type WidgetStyle = BTreeMap<String, String>;

/// Type-specific settings. Known keys are typed; anything else is kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Title override (falls back to the device label).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit suffix for counters and climate readings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Dimmer step for +/- adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
    /// strftime format for clocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ── Descriptor ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    #[serde(default = "WidgetId::generate")]
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(default)]
    pub layout: LayoutRect,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: WidgetStyle,
    #[serde(default)]
    pub config: WidgetConfig,
}

impl WidgetDescriptor {
    pub fn new(kind: WidgetKind, device_id: Option<DeviceId>, layout: LayoutRect) -> Self {
        Self {
            id: WidgetId::generate(),
            kind,
            device_id,
            layout,
            style: WidgetStyle::new(),
            config: WidgetConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_tags_round_trip_through_strings() {
        for kind in WidgetKind::KNOWN {
            let tag = String::from(kind.clone());
            assert_eq!(WidgetKind::from(tag), kind);
        }
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let kind: WidgetKind = serde_json::from_value(json!("weather")).unwrap();
        assert_eq!(kind, WidgetKind::Other("weather".into()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!("weather"));
        assert!(kind.requires_device());
    }

    #[test]
    fn descriptor_reads_minimal_json() {
        let widget: WidgetDescriptor = serde_json::from_value(json!({
            "type": "switch",
            "deviceId": "lamp",
            "layout": { "x": 2, "y": 0, "w": 2, "h": 2 },
            "config": { "title": "Lamp", "icon": "bulb" }
        }))
        .unwrap();

        assert_eq!(widget.kind, WidgetKind::Switch);
        assert_eq!(widget.device_id, Some(DeviceId::from("lamp")));
        assert_eq!(widget.layout, LayoutRect::new(2, 0, 2, 2));
        assert_eq!(widget.config.title.as_deref(), Some("Lamp"));
        assert_eq!(widget.config.extra.get("icon"), Some(&json!("bulb")));
    }

    #[test]
    fn clock_is_the_only_deviceless_kind() {
        assert!(!WidgetKind::Clock.requires_device());
        assert!(WidgetKind::Dimmer.requires_device());
    }
}
