//! Notification server listener
//!
//! Handles the TCP accept loop and spawns one lifecycle task per subscriber.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::hub::{Hub, HubHandle};
use crate::server::config::ServerConfig;
use crate::session::{serve_subscriber_with_buffer, TcpSubscriber};

/// TCP server that streams change notifications to subscribers
///
/// # Example
/// ```no_run
/// use notify_hub::server::{NotifyServer, ServerConfig};
///
/// # async fn example() -> notify_hub::error::Result<()> {
/// let server = NotifyServer::bind(ServerConfig::default()).await?;
/// let hub = server.handle();
///
/// tokio::spawn(server.run());
/// hub.broadcast("New item added").await?;
/// # Ok(())
/// # }
/// ```
pub struct NotifyServer {
    config: ServerConfig,
    listener: TcpListener,
    hub: Hub<TcpSubscriber>,
    handle: HubHandle<TcpSubscriber>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl NotifyServer {
    /// Bind the listener and build the hub
    ///
    /// The hub starts when the server runs; events broadcast before that
    /// wait in its queue.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let hub = Hub::with_config(config.hub.clone());
        let handle = hub.handle();

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Ok(Self {
            config,
            listener,
            hub,
            handle,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        })
    }

    /// Get a hub handle for notification sources
    pub fn handle(&self) -> HubHandle<TcpSubscriber> {
        self.handle.clone()
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server
    ///
    /// This method runs until the process exits.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    ///
    /// Stops accepting on `shutdown`. Subscribers already connected keep
    /// their sessions; the hub stops once they and every other handle are
    /// gone.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let NotifyServer {
            config,
            listener,
            hub,
            handle,
            next_session_id,
            connection_semaphore,
        } = self;

        tracing::info!(addr = %listener.local_addr()?, "Notification server listening");
        let (_hub, _router) = hub.spawn();

        let acceptor = Acceptor {
            config,
            handle,
            next_session_id,
            connection_semaphore,
        };

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = acceptor.accept_loop(&listener) => {}
        }

        Ok(())
    }
}

/// Accept-side state, split out so the hub can be spawned first
struct Acceptor {
    config: ServerConfig,
    handle: HubHandle<TcpSubscriber>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl Acceptor {
    async fn accept_loop(&self, listener: &TcpListener) {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let (reader, writer) = socket.into_split();
        let conn = Arc::new(TcpSubscriber::new(session_id, writer).with_peer(peer_addr));
        let handle = self.handle.clone();
        let buffer_size = self.config.read_buffer_size;

        tokio::spawn(async move {
            let _permit = permit;

            if let Err(e) = serve_subscriber_with_buffer(&handle, conn, reader, buffer_size).await
            {
                tracing::debug!(
                    session_id = session_id,
                    error = %e,
                    "Subscriber session error"
                );
            }

            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::BytesMut;
    use tokio::io::AsyncReadExt;
    use tokio::sync::oneshot;

    use crate::session::decode_frame;

    use super::*;

    async fn read_frame(stream: &mut TcpStream, buf: &mut BytesMut) -> Option<bytes::Bytes> {
        loop {
            if let Some(frame) = decode_frame(buf) {
                return Some(frame);
            }
            if stream.read_buf(buf).await.ok()? == 0 {
                return None;
            }
        }
    }

    async fn start(
        config: ServerConfig,
    ) -> (SocketAddr, HubHandle<TcpSubscriber>, oneshot::Sender<()>) {
        let server = NotifyServer::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let handle = server.handle();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        tokio::spawn(server.run_until(async move {
            let _ = stop_rx.await;
        }));

        (addr, handle, stop_tx)
    }

    fn local_config() -> ServerConfig {
        ServerConfig::with_addr("127.0.0.1:0".parse().unwrap())
    }

    #[tokio::test]
    async fn test_subscriber_receives_broadcast() {
        let (addr, handle, _stop) = start(local_config()).await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut buf = BytesMut::new();

        // The accept and registration happen asynchronously; keep
        // broadcasting until the first frame arrives.
        let frame = loop {
            handle.broadcast("New item added").await.unwrap();
            if let Ok(frame) =
                tokio::time::timeout(Duration::from_millis(50), read_frame(&mut client, &mut buf))
                    .await
            {
                break frame.unwrap();
            }
        };

        assert_eq!(&frame[..], b"New item added");
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let (addr, handle, _stop) = start(local_config().max_connections(1)).await;

        let mut first = TcpStream::connect(addr).await.unwrap();
        let mut buf = BytesMut::new();
        loop {
            handle.broadcast("hello").await.unwrap();
            if tokio::time::timeout(Duration::from_millis(50), read_frame(&mut first, &mut buf))
                .await
                .is_ok()
            {
                break;
            }
        }

        // Over the limit: the server drops the socket without registering it
        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut rest = BytesMut::new();
        let closed = tokio::time::timeout(
            Duration::from_secs(2),
            read_frame(&mut second, &mut rest),
        )
        .await
        .unwrap();
        assert!(closed.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let server = NotifyServer::bind(local_config()).await.unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(server.run_until(async move {
            let _ = stop_rx.await;
        }));
        stop_tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
