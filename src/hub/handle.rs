//! Cloneable entry point to a running hub

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::error::HubError;

use super::event::ChangeEvent;
use super::router::Registration;

/// Handle to the hub's three inbound queues
///
/// Notification sources call [`broadcast`](HubHandle::broadcast); lifecycle
/// handlers call [`register`](HubHandle::register) and
/// [`unregister`](HubHandle::unregister). The router stops once every clone
/// of the handle is dropped.
pub struct HubHandle<C> {
    register_tx: mpsc::Sender<Registration<C>>,
    unregister_tx: mpsc::Sender<Arc<C>>,
    broadcast_tx: mpsc::Sender<ChangeEvent>,
}

impl<C> Clone for HubHandle<C> {
    fn clone(&self) -> Self {
        Self {
            register_tx: self.register_tx.clone(),
            unregister_tx: self.unregister_tx.clone(),
            broadcast_tx: self.broadcast_tx.clone(),
        }
    }
}

impl<C> std::fmt::Debug for HubHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C> HubHandle<C> {
    pub(crate) fn new(
        register_tx: mpsc::Sender<Registration<C>>,
        unregister_tx: mpsc::Sender<Arc<C>>,
        broadcast_tx: mpsc::Sender<ChangeEvent>,
    ) -> Self {
        Self {
            register_tx,
            unregister_tx,
            broadcast_tx,
        }
    }

    /// Register a subscriber connection
    ///
    /// Returns once the router has added the connection, so every event
    /// broadcast after this call returns is delivered to it.
    pub async fn register(&self, conn: Arc<C>) -> Result<(), HubError> {
        let (ack, ack_rx) = oneshot::channel();

        self.register_tx
            .send(Registration { conn, ack })
            .await
            .map_err(|_| HubError::Closed)?;

        ack_rx.await.map_err(|_| HubError::Closed)
    }

    /// Queue removal of a subscriber connection
    ///
    /// Unregistering a connection that is not registered (or was already
    /// removed after a failed send) is not an error.
    pub async fn unregister(&self, conn: Arc<C>) -> Result<(), HubError> {
        self.unregister_tx
            .send(conn)
            .await
            .map_err(|_| HubError::Closed)
    }

    /// Queue an event for fan-out to every registered subscriber
    ///
    /// Waits only for queue space, never for delivery.
    pub async fn broadcast(&self, event: impl Into<ChangeEvent>) -> Result<(), HubError> {
        self.broadcast_tx
            .send(event.into())
            .await
            .map_err(|_| HubError::Closed)
    }

    /// Queue an event without waiting for queue space
    pub fn try_broadcast(&self, event: impl Into<ChangeEvent>) -> Result<(), HubError> {
        self.broadcast_tx
            .try_send(event.into())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => HubError::Full,
                mpsc::error::TrySendError::Closed(_) => HubError::Closed,
            })
    }

    /// Whether the router has stopped
    pub fn is_closed(&self) -> bool {
        self.broadcast_tx.is_closed()
    }
}
