// ── State stores ──
//
// The device registry (remote snapshot) and the dashboard model (local
// pages and widgets).

mod dashboard;
mod device_registry;

pub use dashboard::DashboardModel;
pub use device_registry::{DeviceRegistry, DeviceSnapshot};
