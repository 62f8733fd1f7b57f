// hearthdash-core: Dashboard model, layout engine, and device synchronization
// between hearthdash-api and the terminal surface.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod layout;
pub mod model;
pub mod resolver;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{CommandDispatcher, DeviceCommand};
pub use config::{DashboardConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use layout::{Breakpoint, GridEdit, GridItem, ResponsiveLayout};
pub use resolver::{Interaction, ResolvedWidget, WidgetVariant, resolve};
pub use session::{DashboardSession, Mode};
pub use store::{DashboardModel, DeviceRegistry, DeviceSnapshot};
pub use stream::DeviceStream;

pub use model::{
    Dashboard, Device, DeviceId, LayoutRect, PALETTE, Page, PageId, Rgb, SwitchState,
    WidgetConfig, WidgetDescriptor, WidgetId, WidgetKind,
};
