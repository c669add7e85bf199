//! Transport layer for attendance terminals
//!
//! Provides the byte pipe the command engine drives. Devices speak a
//! strictly half-duplex request/reply protocol over one TCP stream.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Byte transport to a device
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to device
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from device (no-op when not connected)
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if the socket has a remote peer
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive whatever bytes arrive next
    ///
    /// Fails with [`Error::ReadTimeout`] if nothing arrives within `timeout`.
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
