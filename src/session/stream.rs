//! Framed byte-stream subscriber
//!
//! Wraps the write half of a stream (a TCP socket in the server) and
//! implements [`Connection`] on top of the length-prefixed framing in
//! [`frame`](super::frame).

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{watch, Mutex};

use crate::hub::{ChangeEvent, Connection};

use super::frame::{encode_frame, CLOSE_FRAME, MAX_FRAME_SIZE};

/// Subscriber over a TCP socket's write half
pub type TcpSubscriber = StreamSubscriber<OwnedWriteHalf>;

/// A subscriber connection writing frames to an `AsyncWrite`
///
/// The writer is dropped on [`close`](Connection::close); later sends fail
/// with `NotConnected` and later closes do nothing. Closing also aborts a
/// write that is stuck on a peer which stopped reading.
pub struct StreamSubscriber<W> {
    session_id: u64,
    peer_addr: Option<SocketAddr>,
    writer: Mutex<Option<W>>,

    /// Flipped to `true` by `close`; in-flight writes watch it
    shutdown: watch::Sender<bool>,
}

impl<W> StreamSubscriber<W> {
    /// Wrap a writer
    pub fn new(session_id: u64, writer: W) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            session_id,
            peer_addr: None,
            writer: Mutex::new(Some(writer)),
            shutdown,
        }
    }

    /// Attach the remote address (for logging)
    pub fn with_peer(mut self, peer_addr: SocketAddr) -> Self {
        self.peer_addr = Some(peer_addr);
        self
    }

    /// Session ID assigned by the server
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Remote peer address, if known
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Whether the writer has been closed
    pub async fn is_closed(&self) -> bool {
        self.writer.lock().await.is_none()
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> StreamSubscriber<W> {
    async fn write_raw(&self, data: &[u8]) -> io::Result<()> {
        // Subscribe before locking: a close issued while we wait for the
        // lock must still cancel the write below.
        let mut shutdown = self.shutdown.subscribe();
        let closed = *shutdown.borrow();
        if closed {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }

        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;

        tokio::select! {
            result = async {
                writer.write_all(data).await?;
                writer.flush().await
            } => result,
            _ = shutdown.changed() => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "subscriber closed during write",
            )),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> Connection for StreamSubscriber<W> {
    async fn send(&self, event: &ChangeEvent) -> io::Result<()> {
        // A zero-length frame would read as a close frame
        if event.is_empty() {
            tracing::trace!(session_id = self.session_id, "Skipping empty event");
            return Ok(());
        }

        // Unframeable, but the connection itself is healthy
        if event.len() > MAX_FRAME_SIZE {
            tracing::warn!(
                session_id = self.session_id,
                bytes = event.len(),
                max = MAX_FRAME_SIZE,
                "Dropping event larger than a frame"
            );
            return Ok(());
        }

        let frame = encode_frame(event.data())?;
        self.write_raw(&frame).await
    }

    async fn send_close(&self) -> io::Result<()> {
        self.write_raw(&CLOSE_FRAME).await
    }

    async fn close(&self) {
        self.shutdown.send_replace(true);
        let writer = self.writer.lock().await.take();

        if let Some(mut writer) = writer {
            if let Err(e) = writer.shutdown().await {
                tracing::trace!(session_id = self.session_id, error = %e, "Shutdown error");
            }
            tracing::debug!(
                session_id = self.session_id,
                peer = ?self.peer_addr,
                "Subscriber closed"
            );
        }
    }
}
