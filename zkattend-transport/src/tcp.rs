//! TCP transport

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use zkattend_core::constants::{DEFAULT_CONNECT_TIMEOUT_MS, READ_BUFFER_SIZE};

use crate::{error::*, Transport};

/// TCP transport for attendance terminals
pub struct TcpTransport {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            socket_addr: None,
            stream: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.socket_addr {
            return Ok(addr);
        }

        let addr_str = format!("{}:{}", self.addr, self.port);

        let addr = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))?;

        self.socket_addr = Some(addr);
        Ok(addr)
    }

    /// Drop the stream after a failed read or write
    fn drop_stream(&mut self) {
        if self.stream.take().is_some() {
            warn!(addr = %self.remote_addr(), "Dropping broken connection");
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        // Requests are tiny; do not let Nagle hold them back
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.remote_addr());

            if let Err(err) = stream.shutdown().await {
                // Peer may already be gone
                debug!(error = %err, "Shutdown failed");
            }
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|stream| stream.peer_addr().is_ok())
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!(len = data.len(), bytes = %hex::encode(data), "Sending");

        let written = match stream.write_all(data).await {
            Ok(()) => stream.flush().await,
            Err(err) => Err(err),
        };

        if let Err(err) = written {
            self.drop_stream();
            return Err(Error::Io(err));
        }

        Ok(())
    }

    async fn receive(&mut self, wait: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

        let n = match timeout(wait, stream.read_buf(&mut buf)).await {
            Err(_) => return Err(Error::ReadTimeout),
            Ok(Ok(n)) => n,
            Ok(Err(err)) => {
                self.drop_stream();
                return Err(Error::Io(err));
            }
        };

        if n == 0 {
            self.drop_stream();
            return Err(Error::ConnectionClosed);
        }

        trace!(len = n, bytes = %hex::encode(&buf[..n.min(64)]), "Received");

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!("TCP transport dropped while still connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;
    use zkattend_core::ErrorCode;

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn test_tcp_transport_create() {
        let transport = TcpTransport::new("192.168.1.201", 4370);
        assert!(!transport.is_connected());
        assert_eq!(transport.remote_addr(), "192.168.1.201:4370");
    }

    #[tokio::test]
    async fn test_tcp_transport_invalid_address() {
        let mut transport = TcpTransport::new("invalid..address", 4370)
            .with_connect_timeout(Duration::from_millis(100));

        let result = transport.connect().await;
        assert!(result.is_err());
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let (listener, port) = listener().await;
        drop(listener);

        let mut transport = TcpTransport::new("127.0.0.1", port);
        let err = transport.connect().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_send_receive() {
        let (listener, port) = listener().await;

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&[buf[3], buf[2], buf[1], buf[0]]).await.unwrap();
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();
        assert!(transport.is_connected());
        assert!(matches!(
            transport.connect().await,
            Err(Error::AlreadyConnected)
        ));

        transport.send(&[1, 2, 3, 4]).await.unwrap();

        let mut received = BytesMut::new();
        while received.len() < 4 {
            let chunk = transport.receive(Duration::from_secs(1)).await.unwrap();
            received.extend_from_slice(&chunk);
        }
        assert_eq!(received.as_ref(), &[4, 3, 2, 1]);

        server.await.unwrap();
        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_receive_timeout() {
        let (listener, port) = listener().await;

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            drop(socket);
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();

        let result = transport.receive(Duration::from_millis(50)).await;
        assert!(matches!(result, Err(Error::ReadTimeout)));
        // A quiet line is not a broken one
        assert!(transport.is_connected());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_close() {
        let (listener, port) = listener().await;

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();
        server.await.unwrap();

        let result = transport.receive(Duration::from_secs(1)).await;
        assert!(matches!(
            result,
            Err(Error::ConnectionClosed) | Err(Error::Io(_))
        ));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_not_connected() {
        let mut transport = TcpTransport::new("127.0.0.1", 1);

        assert!(matches!(
            transport.send(&[0]).await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            transport.receive(Duration::from_millis(10)).await,
            Err(Error::NotConnected)
        ));
        // Disconnect without a socket is a no-op
        transport.disconnect().await.unwrap();
    }
}
