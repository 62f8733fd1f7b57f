// ── Device registry ──
//
// Holds the last fetched device snapshot. Each fetch replaces the
// snapshot wholesale; subscribers are notified through a `watch` channel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Device, DeviceId};
use crate::stream::DeviceStream;

/// Immutable device list with an id index.
///
/// If the hub reports the same id twice, lookups return the first entry.
#[derive(Debug, Default)]
pub struct DeviceSnapshot {
    devices: Vec<Arc<Device>>,
    index: HashMap<DeviceId, usize>,
}

impl DeviceSnapshot {
    pub fn new(devices: Vec<Device>) -> Self {
        let devices: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();
        let mut index = HashMap::with_capacity(devices.len());
        for (i, device) in devices.iter().enumerate() {
            index.entry(device.id.clone()).or_insert(i);
        }
        Self { devices, index }
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Arc<Device>> {
        self.index.get(id).and_then(|&i| self.devices.get(i))
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Reactive store for the device snapshot.
pub struct DeviceRegistry {
    snapshot: watch::Sender<Arc<DeviceSnapshot>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(DeviceSnapshot::default()));
        let (last_refresh, _) = watch::channel(None);
        Self {
            snapshot,
            last_refresh,
        }
    }

    /// Replace the whole snapshot. No merge with the previous one.
    pub fn replace(&self, devices: Vec<Device>) {
        let next = Arc::new(DeviceSnapshot::new(devices));
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(next);
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.snapshot.borrow().get(id).cloned()
    }

    pub fn device_count(&self) -> usize {
        self.snapshot.borrow().len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> DeviceStream {
        DeviceStream::new(self.snapshot.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last refresh happened, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn device(id: &str, value: &str) -> Device {
        Device {
            id: DeviceId::from(id),
            label: id.to_uppercase(),
            kind: "switch".into(),
            value: value.into(),
            is_active: true,
        }
    }

    #[test]
    fn replace_is_wholesale() {
        let registry = DeviceRegistry::new();
        registry.replace(vec![device("a", "On"), device("b", "Off")]);
        assert_eq!(registry.device_count(), 2);

        registry.replace(vec![device("c", "On")]);
        assert_eq!(registry.device_count(), 1);
        assert!(registry.device(&DeviceId::from("a")).is_none());
        assert_eq!(registry.device(&DeviceId::from("c")).unwrap().value, "On");
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let snap = DeviceSnapshot::new(vec![device("a", "On"), device("a", "Off")]);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get(&DeviceId::from("a")).unwrap().value, "On");
    }

    #[test]
    fn refresh_time_recorded() {
        let registry = DeviceRegistry::new();
        assert!(registry.last_refresh().is_none());
        registry.replace(Vec::new());
        assert!(registry.data_age().is_some());
    }

    #[test]
    fn old_snapshots_stay_valid() {
        let registry = DeviceRegistry::new();
        registry.replace(vec![device("a", "On")]);
        let held = registry.snapshot();
        registry.replace(Vec::new());
        assert_eq!(held.len(), 1);
        assert!(registry.snapshot().is_empty());
    }
}
