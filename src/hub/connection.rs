//! Subscriber connection abstraction
//!
//! The hub never looks inside a connection. It only needs to push a payload,
//! attempt a close frame, and close. Connections are shared as `Arc<C>` and
//! identified by their allocation, so two handles to the same `Arc` are the
//! same subscriber.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;

use super::event::ChangeEvent;

/// A streaming connection to one remote subscriber
///
/// Implementations must make [`close`](Connection::close) idempotent: both a
/// failing dispatch worker and the lifecycle handler may call it.
pub trait Connection: Send + Sync + 'static {
    /// Write one event to the subscriber
    fn send(&self, event: &ChangeEvent) -> impl Future<Output = io::Result<()>> + Send;

    /// Best-effort close handshake (e.g. a close frame)
    fn send_close(&self) -> impl Future<Output = io::Result<()>> + Send;

    /// Close the underlying transport
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Identity of a registered connection
///
/// Derived from the `Arc` allocation address. The hub only derives keys from
/// handles it is currently holding, so an address cannot be reused while the
/// key is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnKey(usize);

impl ConnKey {
    /// Key for a connection handle
    pub fn of<C>(conn: &Arc<C>) -> Self {
        ConnKey(Arc::as_ptr(conn) as *const () as usize)
    }
}

impl fmt::Display for ConnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
