// ── Reactive device stream ──
//
// Subscription type for consuming snapshot replacements from the
// DeviceRegistry.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::DeviceSnapshot;

/// A subscription to the device snapshot.
///
/// Provides point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct DeviceStream {
    current: Arc<DeviceSnapshot>,
    receiver: watch::Receiver<Arc<DeviceSnapshot>>,
}

impl DeviceStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<DeviceSnapshot>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<DeviceSnapshot> {
        &self.current
    }

    /// Wait for the next replacement, returning the new snapshot.
    /// Returns `None` if the registry has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<DeviceSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream`. The first item is the current snapshot.
    pub fn into_stream(self) -> DeviceWatchStream {
        DeviceWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct DeviceWatchStream {
    inner: WatchStream<Arc<DeviceSnapshot>>,
}

impl Stream for DeviceWatchStream {
    type Item = Arc<DeviceSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Device, DeviceId};
    use crate::store::DeviceRegistry;

    #[tokio::test]
    async fn changed_yields_replacement() {
        let registry = DeviceRegistry::new();
        let mut stream = registry.subscribe();
        assert!(stream.current().is_empty());

        registry.replace(vec![Device {
            id: DeviceId::from("a"),
            label: "A".into(),
            kind: "switch".into(),
            value: "On".into(),
            is_active: true,
        }]);

        let snap = stream.changed().await.expect("registry alive");
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.current().len(), 1);
    }

    #[tokio::test]
    async fn into_stream_starts_with_current_snapshot() {
        use tokio_stream::StreamExt;

        let registry = DeviceRegistry::new();
        let mut stream = registry.subscribe().into_stream();

        let first = stream.next().await.expect("initial snapshot");
        assert!(first.is_empty());

        registry.replace(vec![Device {
            id: DeviceId::from("b"),
            label: "B".into(),
            kind: "dimmer".into(),
            value: "40".into(),
            is_active: true,
        }]);
        let next = stream.next().await.expect("replacement");
        assert_eq!(next.devices()[0].value, "40");

        drop(registry);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn changed_ends_when_registry_dropped() {
        let registry = DeviceRegistry::new();
        let mut stream = registry.subscribe();
        drop(registry);
        assert!(stream.changed().await.is_none());
    }
}
