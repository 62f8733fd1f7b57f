// ── Widget resolver ──
//
// Turns a descriptor plus the current device snapshot into something
// renderable. A missing or unknown binding is an empty slot, not an error.

use std::sync::Arc;

use crate::command::{self, DeviceCommand};
use crate::model::{Device, Rgb, WidgetConfig, WidgetDescriptor, WidgetKind};
use crate::store::DeviceSnapshot;

/// Concrete widget variant. Device-backed variants hold the device as it
/// was in the snapshot used for resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetVariant {
    Clock,
    Switch(Arc<Device>),
    BinaryState(Arc<Device>),
    Climate(Arc<Device>),
    Color(Arc<Device>),
    Counter(Arc<Device>),
    Dimmer(Arc<Device>),
}

impl WidgetVariant {
    pub fn device(&self) -> Option<&Arc<Device>> {
        match self {
            Self::Clock => None,
            Self::Switch(d)
            | Self::BinaryState(d)
            | Self::Climate(d)
            | Self::Color(d)
            | Self::Counter(d)
            | Self::Dimmer(d) => Some(d),
        }
    }
}

/// User input a rendered widget can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Toggle,
    SetLevel(u8),
    PickColor(Rgb),
}

/// A descriptor bound to its device.
#[derive(Debug, Clone)]
pub struct ResolvedWidget<'a> {
    pub descriptor: &'a WidgetDescriptor,
    pub variant: WidgetVariant,
}

impl ResolvedWidget<'_> {
    pub fn config(&self) -> &WidgetConfig {
        &self.descriptor.config
    }

    pub fn device(&self) -> Option<&Arc<Device>> {
        self.variant.device()
    }

    /// Configured title, else the device label, else the kind tag.
    pub fn title(&self) -> &str {
        self.descriptor
            .config
            .title
            .as_deref()
            .or_else(|| self.device().map(|d| d.label.as_str()))
            .unwrap_or_else(|| self.descriptor.kind.tag())
    }

    /// The command this interaction produces, if the variant accepts it.
    ///
    /// Switches and color controls toggle; dimmers take a level; color
    /// controls take a color. Everything else is read-only.
    pub fn interact(&self, interaction: Interaction) -> Option<DeviceCommand> {
        match (&self.variant, interaction) {
            (WidgetVariant::Switch(device) | WidgetVariant::Color(device), Interaction::Toggle) => {
                Some(command::on_switch_click(device))
            }
            (WidgetVariant::Dimmer(device), Interaction::SetLevel(level)) => {
                Some(command::on_level_set(device, level))
            }
            (WidgetVariant::Color(device), Interaction::PickColor(color)) => {
                Some(command::on_color_set(device, color))
            }
            _ => None,
        }
    }
}

/// Resolve a descriptor against a snapshot. `None` means an empty slot.
pub fn resolve<'a>(
    descriptor: &'a WidgetDescriptor,
    snapshot: &DeviceSnapshot,
) -> Option<ResolvedWidget<'a>> {
    let device = descriptor
        .device_id
        .as_ref()
        .and_then(|id| snapshot.get(id))
        .cloned();

    let variant = match (&descriptor.kind, device) {
        (WidgetKind::Clock, _) => WidgetVariant::Clock,
        (WidgetKind::Switch, Some(d)) => WidgetVariant::Switch(d),
        (WidgetKind::BinaryState, Some(d)) => WidgetVariant::BinaryState(d),
        (WidgetKind::Climate, Some(d)) => WidgetVariant::Climate(d),
        (WidgetKind::Color, Some(d)) => WidgetVariant::Color(d),
        (WidgetKind::Counter, Some(d)) => WidgetVariant::Counter(d),
        (WidgetKind::Dimmer, Some(d)) => WidgetVariant::Dimmer(d),
        _ => return None,
    };

    Some(ResolvedWidget {
        descriptor,
        variant,
    })
}
