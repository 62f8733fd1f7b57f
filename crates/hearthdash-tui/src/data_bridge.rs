//! Data bridge: connects [Controller] streams to TUI actions.
//!
//! Starts the controller's background tasks, then forwards every snapshot
//! replacement and connection-state transition as an [`Action`] until
//! cancelled. Shutting down the bridge shuts down the controller.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use hearthdash_core::Controller;

use crate::action::Action;

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // The stream yields the current snapshot first, then each replacement.
    let mut devices = controller.devices().into_stream();
    let mut conn_state = controller.connection_state();

    controller.start().await;

    let _ = action_tx.send(Action::ConnectionChanged(
        conn_state.borrow_and_update().clone(),
    ));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = devices.next() => {
                debug!(devices = snapshot.len(), "dispatching DevicesUpdated");
                let _ = action_tx.send(Action::DevicesUpdated(snapshot));
            }
            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                let _ = action_tx.send(Action::ConnectionChanged(state));
            }
        }
    }

    controller.shutdown().await;
    debug!("data bridge shut down");
}
