//! Change-notification hub
//!
//! The hub decouples writers that trigger change events from subscribers
//! that hold long-lived streaming connections. A single router task owns the
//! set of live connections; every mutation and every fan-out goes through
//! its queue, so the registry needs no lock.
//!
//! # Architecture
//!
//! ```text
//!   [Notification source]        [Lifecycle handler]
//!     handle.broadcast()    handle.register() / handle.unregister()
//!            │                         │
//!            ▼                         ▼
//!   ┌─────────────────────────────────────────────┐
//!   │ Router task                                 │
//!   │   select! { register, unregister, broadcast }│
//!   │   registry: HashMap<ConnKey, (conn, record)>│
//!   └──────────────────────┬──────────────────────┘
//!                          │ tokio::spawn per subscriber
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!     [dispatch]      [dispatch]      [dispatch]
//!     lock record     lock record     lock record
//!     conn.send()     conn.send()     conn.send() ──► fails: close,
//!                                                     unregister
//! ```
//!
//! # Failure isolation
//!
//! Each dispatch worker blocks only on its own connection. A failed write
//! marks the record as closing, closes the connection and queues it for
//! removal; it is never reported to the notification source or to other
//! subscribers.
//!
//! # Zero-copy fan-out
//!
//! [`ChangeEvent`] wraps `bytes::Bytes`, so every worker shares the same
//! payload allocation.

pub mod config;
pub mod connection;
pub(crate) mod dispatch;
pub mod event;
pub mod handle;
pub(crate) mod record;
pub(crate) mod registry;
pub(crate) mod router;

use tokio::task::JoinHandle;

pub use config::HubConfig;
pub use connection::{ConnKey, Connection};
pub use event::ChangeEvent;
pub use handle::HubHandle;

use router::Router;

/// The hub: registry, router and the queues that feed it
///
/// Build one at startup, hand [`HubHandle`] clones to every collaborator,
/// and drive it with [`run`](Hub::run) or [`spawn`](Hub::spawn).
///
/// # Example
/// ```no_run
/// use notify_hub::hub::Hub;
/// use notify_hub::session::TcpSubscriber;
///
/// # async fn example() -> notify_hub::error::Result<()> {
/// let (handle, _task) = Hub::<TcpSubscriber>::new().spawn();
///
/// handle.broadcast("New item added").await?;
/// # Ok(())
/// # }
/// ```
pub struct Hub<C> {
    router: Router<C>,
    handle: HubHandle<C>,
}

impl<C: Connection> Hub<C> {
    /// Create a hub with default queue capacities
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with custom queue capacities
    pub fn with_config(config: HubConfig) -> Self {
        let (router, handle) = Router::new(&config);
        Self { router, handle }
    }

    /// Get a handle for collaborators
    ///
    /// Handles may be taken before the hub starts running; their sends wait
    /// in the queues until it does.
    pub fn handle(&self) -> HubHandle<C> {
        self.handle.clone()
    }

    /// Run the router on the current task until every handle is dropped
    pub async fn run(self) {
        let Hub { router, handle } = self;
        drop(handle);
        router.run().await;
    }

    /// Spawn the router on the tokio runtime
    ///
    /// Returns a handle and the router's task. The task finishes once every
    /// handle is dropped.
    pub fn spawn(self) -> (HubHandle<C>, JoinHandle<()>) {
        let Hub { router, handle } = self;
        let task = tokio::spawn(router.run());
        (handle, task)
    }
}

impl<C: Connection> Default for Hub<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::error::HubError;

    use super::*;

    struct NullConn;

    impl Connection for NullConn {
        async fn send(&self, _event: &ChangeEvent) -> io::Result<()> {
            Ok(())
        }

        async fn send_close(&self) -> io::Result<()> {
            Ok(())
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn test_handle_before_run() {
        let hub = Hub::<NullConn>::new();
        let handle = hub.handle();

        handle.broadcast("queued").await.unwrap();

        let task = tokio::spawn(hub.run());
        handle.register(Arc::new(NullConn)).await.unwrap();

        drop(handle);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_after_router_stops() {
        let hub = Hub::<NullConn>::new();
        let (handle, task) = hub.spawn();
        task.abort();
        let _ = task.await;

        assert!(handle.is_closed());
        assert_eq!(handle.broadcast("late").await, Err(HubError::Closed));
        assert_eq!(
            handle.register(Arc::new(NullConn)).await,
            Err(HubError::Closed)
        );
        assert_eq!(handle.try_broadcast("late"), Err(HubError::Closed));
    }

    #[tokio::test]
    async fn test_try_broadcast_full() {
        // Router never started, so the single slot stays occupied
        let hub = Hub::<NullConn>::with_config(HubConfig::default().broadcast_capacity(1));
        let handle = hub.handle();

        assert_eq!(handle.try_broadcast("one"), Ok(()));
        assert_eq!(handle.try_broadcast("two"), Err(HubError::Full));
    }
}
