// ── Domain model ──
//
// Devices come from the hub; pages and widget descriptors are owned by
// the dashboard and persisted by the caller.

pub mod color;
pub mod device;
pub mod page;
pub mod widget;

pub use color::{PALETTE, ParseColorError, Rgb};
pub use device::{Device, DeviceId, SwitchState};
pub use page::{Dashboard, Page, PageId};
pub use widget::{LayoutRect, WidgetConfig, WidgetDescriptor, WidgetId, WidgetKind, WidgetStyle};
