// hearthdash-api: Async Rust client for the remote device API.

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use client::DeviceClient;
pub use error::Error;
pub use models::{ApiColor, ApiDevice, DeviceCommandBody};
pub use transport::{TlsMode, TransportConfig};
