//! Dispatch workers
//!
//! One worker runs per (broadcast event, subscriber) pair. A worker blocks
//! only itself: a stalled or failing subscriber never holds up the router
//! or the other workers.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::connection::{ConnKey, Connection};
use super::event::ChangeEvent;
use super::record::SubscriberRecord;

/// Result of one send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchOutcome {
    /// Payload written
    Delivered,
    /// Connection already closing, nothing sent
    Skipped,
    /// Write failed; connection closed and queued for unregistration
    Failed,
}

/// Send `event` to one subscriber
///
/// The record lock is held from the closing check through the failure
/// teardown, so a second worker for the same connection either waits and
/// then sees `closing`, or runs strictly after a successful send.
pub(crate) async fn dispatch<C: Connection>(
    conn: Arc<C>,
    record: Arc<SubscriberRecord>,
    event: ChangeEvent,
    unregister_tx: mpsc::Sender<Arc<C>>,
) -> DispatchOutcome {
    let key = ConnKey::of(&conn);
    let mut state = record.lock().await;

    if state.closing {
        tracing::trace!(conn = %key, "Skipping send to closing connection");
        return DispatchOutcome::Skipped;
    }

    let result = conn.send(&event).await;

    match result {
        Ok(()) => {
            state.delivered += 1;
            DispatchOutcome::Delivered
        }
        Err(e) => {
            state.closing = true;

            tracing::warn!(
                conn = %key,
                error = %e,
                delivered = state.delivered,
                connected_secs = record.age().as_secs(),
                "Write error, closing subscriber"
            );

            let _ = conn.send_close().await;
            conn.close().await;
            drop(state);

            if unregister_tx.send(conn).await.is_err() {
                tracing::debug!(conn = %key, "Router stopped before unregister");
            }

            DispatchOutcome::Failed
        }
    }
}
