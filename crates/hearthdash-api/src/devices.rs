// Device endpoints
//
// One read (`GET devices`) and one write (`PATCH devices/{id}`) carrying
// a single state, color, or level field.

use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::{ApiDevice, DeviceCommandBody};

impl DeviceClient {
    /// List every device known to the hub.
    ///
    /// `GET {base}/devices`
    pub async fn list_devices(&self) -> Result<Vec<ApiDevice>, Error> {
        let url = self.url("devices")?;
        self.get(url).await
    }

    /// Send a raw command body to a device.
    ///
    /// `PATCH {base}/devices/{id}`
    pub async fn send_command(&self, id: &str, body: &DeviceCommandBody) -> Result<(), Error> {
        let url = self.device_url(id)?;
        debug!(id, ?body, "sending device command");
        self.patch_no_response(url, body).await
    }
}
