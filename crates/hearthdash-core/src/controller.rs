// ── Controller ──
//
// Session object owning the polling timer and the command processor.
// Background tasks hold only the client, registry, and cancellation
// token, so dropping the last `Controller` handle stops them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hearthdash_api::{DeviceClient, TlsMode, TransportConfig};

use crate::command::{CommandDispatcher, DeviceCommand};
use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::Device;
use crate::store::{DeviceRegistry, DeviceSnapshot};
use crate::stream::DeviceStream;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Health of the polling loop, observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The last `failures` fetches in a row failed; the snapshot is stale.
    Degraded { failures: u32 },
}

// ── Controller ───────────────────────────────────────────────────

/// Cheaply cloneable handle to one dashboard session.
///
/// Construction does not touch the network; [`start()`](Self::start)
/// spawns the refresh and command tasks.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DashboardConfig,
    client: Arc<DeviceClient>,
    registry: Arc<DeviceRegistry>,
    dispatcher: CommandDispatcher,
    command_rx: Mutex<Option<mpsc::Receiver<DeviceCommand>>>,
    connection_state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Controller {
    /// Build a controller and its HTTP client from configuration.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = DeviceClient::new(config.api_url.as_str(), config.token.as_ref(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Build a controller around an existing client.
    pub fn with_client(config: DashboardConfig, client: DeviceClient) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                client: Arc::new(client),
                registry: Arc::new(DeviceRegistry::new()),
                dispatcher: CommandDispatcher::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                connection_state: Arc::new(connection_state),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the refresh task (first fetch immediately) and the command
    /// processor. Calling this twice is a no-op.
    pub async fn start(&self) {
        let Some(rx) = self.inner.command_rx.lock().await.take() else {
            debug!("controller already started");
            return;
        };

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(command_processor_task(
            Arc::clone(&self.inner.client),
            rx,
            self.inner.cancel.clone(),
        )));
        handles.push(tokio::spawn(refresh_task(
            Arc::clone(&self.inner.client),
            Arc::clone(&self.inner.registry),
            Arc::clone(&self.inner.connection_state),
            self.inner.config.poll_interval,
            self.inner.cancel.clone(),
        )));

        info!(
            url = %self.inner.config.api_url,
            interval = ?self.inner.config.poll_interval,
            "dashboard session started"
        );
    }

    /// Stop both background tasks and wait for them to finish.
    ///
    /// No fetch or command is issued after this returns.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("dashboard session stopped");
    }

    /// Fetch the device list once and replace the snapshot.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let devices = fetch_devices(&self.inner.client).await?;
        self.inner.registry.replace(devices);
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.inner.registry
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.inner.dispatcher
    }

    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.inner.registry.snapshot()
    }

    pub fn devices(&self) -> DeviceStream {
        self.inner.registry.subscribe()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Fetch on a fixed period until cancelled. A failed fetch keeps the
/// previous snapshot and waits for the next tick.
async fn refresh_task(
    client: Arc<DeviceClient>,
    registry: Arc<DeviceRegistry>,
    state: Arc<watch::Sender<ConnectionState>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = fetch_devices(&client) => result,
        };

        match result {
            Ok(devices) => {
                registry.replace(devices);
                failures = 0;
                state.send_if_modified(|s| {
                    let changed = *s != ConnectionState::Connected;
                    *s = ConnectionState::Connected;
                    changed
                });
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                warn!(error = %e, failures, "device refresh failed");
                state.send_replace(ConnectionState::Degraded { failures });
            }
        }
    }
}

/// Drain queued commands in order. Failures are logged and dropped.
async fn command_processor_task(
    client: Arc<DeviceClient>,
    mut rx: mpsc::Receiver<DeviceCommand>,
    cancel: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            command = rx.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        let (device_id, body) = command.into_request();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = client.send_command(device_id.as_str(), &body) => result,
        };

        match result {
            Ok(()) => debug!(device = %device_id, ?body, "command sent"),
            Err(e) => warn!(device = %device_id, error = %e, "device command failed"),
        }
    }
}

async fn fetch_devices(client: &DeviceClient) -> Result<Vec<Device>, CoreError> {
    let devices: Vec<Device> = client
        .list_devices()
        .await?
        .into_iter()
        .map(Device::from)
        .collect();
    debug!(devices = devices.len(), "device refresh complete");
    Ok(devices)
}

// ── Transport ────────────────────────────────────────────────────

fn build_transport(config: &DashboardConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
