// ── Command dispatch ──
//
// Widget interactions become `DeviceCommand`s. The derivation rules are
// pure functions; delivery is fire-and-forget through a bounded channel
// drained by the controller's command processor.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::model::{Device, DeviceId, Rgb, SwitchState};

/// A write against one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    SetState { device_id: DeviceId, state: SwitchState },
    SetColor { device_id: DeviceId, color: Rgb },
    SetLevel { device_id: DeviceId, level: u8 },
}

impl DeviceCommand {
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::SetState { device_id, .. }
            | Self::SetColor { device_id, .. }
            | Self::SetLevel { device_id, .. } => device_id,
        }
    }
}

// ── Derivation rules ─────────────────────────────────────────────────

/// Send the opposite of the device's current state.
///
/// Anything other than an exact `"On"` is treated as off, so unknown
/// values switch the device on.
pub fn on_switch_click(device: &Device) -> DeviceCommand {
    let state = if device.is_on() {
        SwitchState::Off
    } else {
        SwitchState::On
    };
    DeviceCommand::SetState {
        device_id: device.id.clone(),
        state,
    }
}

/// Pure black switches off, pure white switches on, anything else sets
/// the color.
pub fn on_color_set(device: &Device, color: Rgb) -> DeviceCommand {
    let device_id = device.id.clone();
    if color.is_black() {
        DeviceCommand::SetState {
            device_id,
            state: SwitchState::Off,
        }
    } else if color.is_white() {
        DeviceCommand::SetState {
            device_id,
            state: SwitchState::On,
        }
    } else {
        DeviceCommand::SetColor { device_id, color }
    }
}

pub fn on_level_set(device: &Device, level: u8) -> DeviceCommand {
    DeviceCommand::SetLevel {
        device_id: device.id.clone(),
        level,
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Cheaply cloneable handle for queuing device commands.
///
/// `dispatch` never waits: a full or closed queue drops the command with
/// a warning. Results are observed only through later device refreshes.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    tx: mpsc::Sender<DeviceCommand>,
}

impl CommandDispatcher {
    pub(crate) fn new(tx: mpsc::Sender<DeviceCommand>) -> Self {
        Self { tx }
    }

    /// Queue a command. Returns `false` if it was dropped.
    pub fn dispatch(&self, command: DeviceCommand) -> bool {
        debug!(?command, "dispatching device command");
        match self.tx.try_send(command) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(command)) => {
                warn!(device = %command.device_id(), "command queue full, dropping command");
                false
            }
            Err(mpsc::error::TrySendError::Closed(command)) => {
                warn!(device = %command.device_id(), "command processor stopped, dropping command");
                false
            }
        }
    }

    pub fn switch_click(&self, device: &Device) -> bool {
        self.dispatch(on_switch_click(device))
    }

    pub fn color_set(&self, device: &Device, color: Rgb) -> bool {
        self.dispatch(on_color_set(device, color))
    }

    pub fn level_set(&self, device: &Device, level: u8) -> bool {
        self.dispatch(on_level_set(device, level))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn device(value: &str) -> Device {
        Device {
            id: DeviceId::from("bulb"),
            label: "Bulb".into(),
            kind: "color".into(),
            value: value.into(),
            is_active: true,
        }
    }

    fn set_state(state: SwitchState) -> DeviceCommand {
        DeviceCommand::SetState {
            device_id: DeviceId::from("bulb"),
            state,
        }
    }

    #[test]
    fn switch_click_sends_opposite_state() {
        assert_eq!(on_switch_click(&device("Off")), set_state(SwitchState::On));
        assert_eq!(on_switch_click(&device("On")), set_state(SwitchState::Off));
    }

    #[test]
    fn switch_click_on_unknown_value_turns_on() {
        assert_eq!(on_switch_click(&device("")), set_state(SwitchState::On));
    }

    #[test]
    fn black_is_off_and_white_is_on() {
        assert_eq!(
            on_color_set(&device("On"), Rgb::new(0, 0, 0)),
            set_state(SwitchState::Off)
        );
        assert_eq!(
            on_color_set(&device("Off"), Rgb::new(255, 255, 255)),
            set_state(SwitchState::On)
        );
    }

    #[test]
    fn other_colors_carry_exact_value() {
        assert_eq!(
            on_color_set(&device("On"), Rgb::new(10, 20, 30)),
            DeviceCommand::SetColor {
                device_id: DeviceId::from("bulb"),
                color: Rgb::new(10, 20, 30),
            }
        );
    }

    #[test]
    fn level_set_carries_value() {
        assert_eq!(
            on_level_set(&device("10"), 55),
            DeviceCommand::SetLevel {
                device_id: DeviceId::from("bulb"),
                level: 55,
            }
        );
    }

    #[test]
    fn dispatcher_drops_when_full_or_closed() {
        let (tx, mut rx) = mpsc::channel(1);
        let dispatcher = CommandDispatcher::new(tx);

        assert!(dispatcher.switch_click(&device("On")));
        assert!(!dispatcher.switch_click(&device("On")));
        assert_eq!(rx.try_recv().unwrap(), set_state(SwitchState::Off));

        drop(rx);
        assert!(!dispatcher.level_set(&device("1"), 3));
    }
}
