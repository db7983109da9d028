//! Broadcast router
//!
//! The router is the only owner of the [`Registry`]. Every registration,
//! removal and fan-out passes through its loop one event at a time, so the
//! map itself needs no lock. Fan-out spawns a dispatch worker per
//! subscriber and returns to the loop without waiting for them.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::config::HubConfig;
use super::connection::{ConnKey, Connection};
use super::dispatch::dispatch;
use super::event::ChangeEvent;
use super::handle::HubHandle;
use super::registry::Registry;

/// A registration request, acknowledged once the connection is in the
/// registry
pub(crate) struct Registration<C> {
    pub conn: Arc<C>,
    pub ack: oneshot::Sender<()>,
}

pub(crate) struct Router<C> {
    registry: Registry<C>,
    register_rx: mpsc::Receiver<Registration<C>>,
    unregister_rx: mpsc::Receiver<Arc<C>>,
    broadcast_rx: mpsc::Receiver<ChangeEvent>,

    /// Handed to dispatch workers so they can unregister themselves
    unregister_tx: mpsc::Sender<Arc<C>>,
}

impl<C: Connection> Router<C> {
    /// Create a router and the handle that feeds it
    pub(crate) fn new(config: &HubConfig) -> (Self, HubHandle<C>) {
        // A literal config can carry zero capacities; mpsc needs at least one
        let (register_tx, register_rx) = mpsc::channel(config.register_capacity.max(1));
        let (unregister_tx, unregister_rx) = mpsc::channel(config.unregister_capacity.max(1));
        let (broadcast_tx, broadcast_rx) = mpsc::channel(config.broadcast_capacity.max(1));

        let router = Self {
            registry: Registry::new(),
            register_rx,
            unregister_rx,
            broadcast_rx,
            unregister_tx: unregister_tx.clone(),
        };
        let handle = HubHandle::new(register_tx, unregister_tx, broadcast_tx);

        (router, handle)
    }

    /// Run until every [`HubHandle`] has been dropped
    ///
    /// The unregister queue never closes on its own because the router keeps
    /// a sender for its workers, so the loop ends when the register or the
    /// broadcast queue closes.
    pub(crate) async fn run(mut self) {
        tracing::debug!("Hub router started");

        loop {
            tokio::select! {
                registration = self.register_rx.recv() => match registration {
                    Some(registration) => self.on_register(registration),
                    None => break,
                },
                Some(conn) = self.unregister_rx.recv() => self.on_unregister(conn),
                event = self.broadcast_rx.recv() => match event {
                    Some(event) => self.on_broadcast(event),
                    None => break,
                },
            }
        }

        tracing::info!(
            subscribers = self.registry.len(),
            "Hub router stopped, all handles dropped"
        );
    }

    fn on_register(&mut self, registration: Registration<C>) {
        let Registration { conn, ack } = registration;

        if self.registry.contains(&conn) {
            tracing::debug!(
                conn = %ConnKey::of(&conn),
                "Connection registered twice, replacing record"
            );
        }

        let key = self.registry.add(conn);

        tracing::info!(
            conn = %key,
            subscribers = self.registry.len(),
            "Connection registered"
        );

        // The registrant may have given up waiting; the registration stands.
        let _ = ack.send(());
    }

    fn on_unregister(&mut self, conn: Arc<C>) {
        let key = ConnKey::of(&conn);

        match self.registry.remove(&conn) {
            Some(_) => tracing::info!(
                conn = %key,
                subscribers = self.registry.len(),
                "Connection unregistered"
            ),
            None => tracing::trace!(conn = %key, "Unregister for unknown connection"),
        }
    }

    fn on_broadcast(&mut self, event: ChangeEvent) {
        if self.registry.is_empty() {
            tracing::debug!(bytes = event.len(), "Broadcast with no subscribers");
            return;
        }

        tracing::debug!(
            bytes = event.len(),
            subscribers = self.registry.len(),
            "Broadcasting change event"
        );

        self.registry.for_each(|conn, record| {
            tokio::spawn(dispatch(
                Arc::clone(conn),
                Arc::clone(record),
                event.clone(),
                self.unregister_tx.clone(),
            ));
        });
    }
}
