//! # zkattend
//!
//! Client for the binary TCP protocol spoken by biometric time-attendance
//! terminals.
//!
//! ## Features
//!
//! - Async/await API using Tokio
//! - Reply reassembly that copes with split and header-less bulk transfers
//! - User and attendance record download
//! - Typed errors with stable codes
//!
//! ## Quick Start
//!
//! ```no_run
//! use zkattend::Device;
//!
//! #[tokio::main]
//! async fn main() -> zkattend::Result<()> {
//!     let device = Device::new("192.168.1.201", 4370);
//!     device.connect().await?;
//!     device.open().await?;
//!
//!     let users = device.get_users().await?;
//!     println!("{} users enrolled", users.len());
//!
//!     device.close().await?;
//!     device.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod engine;
pub mod error;

#[cfg(test)]
mod testing;

// Re-exports
pub use device::Device;
pub use engine::CommandEngine;
pub use error::{Error, Result};

// Re-export types
pub use zkattend_core::{Command, ConnectionState, ErrorCode, Reply, ReplyCode, Session};
pub use zkattend_transport::{TcpTransport, Transport};
pub use zkattend_types::{
    AttendanceRecord, Capacities, PackedTime, User, VerifyMethod, VerifyState,
};
