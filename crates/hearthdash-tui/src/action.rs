//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use hearthdash_core::{ConnectionState, Dashboard, DeviceCommand, DeviceSnapshot};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ───────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Overlays ────────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notification),

    // ── Data from the controller ────────────────────────────────────
    DevicesUpdated(Arc<DeviceSnapshot>),
    ConnectionChanged(ConnectionState),

    // ── Outbound ────────────────────────────────────────────────────
    /// Queue a device write.
    Command(DeviceCommand),
    /// Persist the dashboard layout.
    SaveLayout(Dashboard),
}
