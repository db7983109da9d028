//! Per-subscriber state
//!
//! Each registered connection owns one [`SubscriberRecord`]. The router
//! creates it and hands clones to dispatch workers; after that only the
//! worker holding the send lock touches its fields.

use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard};

/// Mutable state guarded by the record's send lock
#[derive(Debug, Default)]
pub(crate) struct RecordState {
    /// Set once a send has failed; no further sends are attempted
    pub closing: bool,

    /// Events successfully written to this connection
    pub delivered: u64,
}

/// Hub-internal state attached to one subscriber connection
#[derive(Debug)]
pub(crate) struct SubscriberRecord {
    state: Mutex<RecordState>,
    registered_at: Instant,
}

impl SubscriberRecord {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RecordState::default()),
            registered_at: Instant::now(),
        }
    }

    /// Acquire the send lock
    ///
    /// Held for the whole check-send-mark sequence so that writes to one
    /// connection never interleave.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, RecordState> {
        self.state.lock().await
    }

    /// How long the subscriber has been registered
    pub(crate) fn age(&self) -> std::time::Duration {
        self.registered_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_record_is_open() {
        let record = SubscriberRecord::new();
        let state = record.lock().await;

        assert!(!state.closing);
        assert_eq!(state.delivered, 0);
    }

    #[tokio::test]
    async fn test_closing_persists() {
        let record = SubscriberRecord::new();
        record.lock().await.closing = true;

        assert!(record.lock().await.closing);
    }
}
