//! Subscriber lifecycle
//!
//! A subscriber only listens. Whatever it sends is read and discarded; the
//! read side exists so that a remote close or a reset is noticed and the
//! connection leaves the hub.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::hub::{ConnKey, Connection, HubHandle};

/// Default inbound read buffer
pub const DEFAULT_READ_BUFFER: usize = 4 * 1024;

/// Serve one subscriber until its inbound stream ends
///
/// Registers `conn`, drains `inbound` until EOF or a read error, then
/// unregisters and closes the connection. Both steps are safe if a dispatch
/// worker already tore the connection down after a failed write.
///
/// Returns the number of inbound bytes discarded.
pub async fn serve_subscriber<C, R>(
    hub: &HubHandle<C>,
    conn: Arc<C>,
    inbound: R,
) -> Result<u64>
where
    C: Connection,
    R: AsyncRead + Unpin,
{
    serve_subscriber_with_buffer(hub, conn, inbound, DEFAULT_READ_BUFFER).await
}

/// [`serve_subscriber`] with an explicit read buffer size
pub async fn serve_subscriber_with_buffer<C, R>(
    hub: &HubHandle<C>,
    conn: Arc<C>,
    mut inbound: R,
    buffer_size: usize,
) -> Result<u64>
where
    C: Connection,
    R: AsyncRead + Unpin,
{
    let key = ConnKey::of(&conn);

    if let Err(e) = hub.register(Arc::clone(&conn)).await {
        conn.close().await;
        return Err(e.into());
    }

    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut discarded = 0u64;

    loop {
        match inbound.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!(conn = %key, "Subscriber closed inbound stream");
                break;
            }
            Ok(n) => discarded += n as u64,
            Err(e) => {
                tracing::debug!(conn = %key, error = %e, "Subscriber read error");
                break;
            }
        }
    }

    let unregistered = hub.unregister(Arc::clone(&conn)).await;
    conn.close().await;
    unregistered?;

    Ok(discarded)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::io::{AsyncWriteExt, DuplexStream};
    use tokio::sync::mpsc;

    use crate::error::{Error, HubError};
    use crate::hub::{ChangeEvent, Hub};
    use crate::session::StreamSubscriber;

    use super::*;

    struct TestConn {
        closes: AtomicUsize,
        delivered: mpsc::UnboundedSender<ChangeEvent>,
    }

    impl Connection for TestConn {
        async fn send(&self, event: &ChangeEvent) -> io::Result<()> {
            let _ = self.delivered.send(event.clone());
            Ok(())
        }

        async fn send_close(&self) -> io::Result<()> {
            Ok(())
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_registered_until_eof() {
        let (handle, _task) = Hub::<TestConn>::new().spawn();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Arc::new(TestConn {
            closes: AtomicUsize::new(0),
            delivered: tx,
        });

        let (mut client, server) = tokio::io::duplex(64);
        let serve = {
            let handle = handle.clone();
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { serve_subscriber(&handle, conn, server).await })
        };

        // Wait until the subscriber is registered
        loop {
            handle.broadcast("ping").await.unwrap();
            if let Ok(Some(event)) =
                tokio::time::timeout(Duration::from_millis(50), rx.recv()).await
            {
                assert_eq!(event.as_str(), Some("ping"));
                break;
            }
        }

        client.write_all(b"ignored").await.unwrap();
        drop(client);

        let discarded = serve.await.unwrap().unwrap();
        assert_eq!(discarded, 7);
        assert_eq!(conn.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hub_stopped_closes_connection() {
        let (handle, task) = Hub::<TestConn>::new().spawn();
        task.abort();
        let _ = task.await;

        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = Arc::new(TestConn {
            closes: AtomicUsize::new(0),
            delivered: tx,
        });
        let (_client, server) = tokio::io::duplex(64);

        let result = serve_subscriber(&handle, Arc::clone(&conn), server).await;

        assert!(matches!(result, Err(Error::Hub(HubError::Closed))));
        assert_eq!(conn.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_eof_closes_subscriber_with_stalled_write() {
        let (handle, _task) = Hub::<StreamSubscriber<DuplexStream>>::new().spawn();

        // Outbound peer never reads; the 4 KiB frame cannot fit in the pipe
        let (writer, _peer) = tokio::io::duplex(64);
        let conn = Arc::new(StreamSubscriber::new(1, writer));
        let (client, server) = tokio::io::duplex(64);

        let serve = {
            let handle = handle.clone();
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { serve_subscriber(&handle, conn, server).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        handle
            .broadcast(ChangeEvent::new(vec![b'x'; 4096]))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(client);

        let discarded = tokio::time::timeout(Duration::from_secs(2), serve)
            .await
            .expect("teardown should not wait on the stalled write")
            .unwrap()
            .unwrap();
        assert_eq!(discarded, 0);
        assert!(conn.is_closed().await);
    }
}
