//! High-level error types

use std::time::Duration;

use zkattend_core::{Command, ErrorCode};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] zkattend_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] zkattend_transport::Error),

    #[error("Decode error: {0}")]
    Types(#[from] zkattend_types::Error),

    #[error("Device not connected")]
    NotConnected,

    #[error("Request cancelled by disconnect")]
    Cancelled,

    #[error("No reply to {command} within {timeout:?}")]
    ExecTimeout { command: Command, timeout: Duration },

    /// The two length fields of a large-transfer handshake disagree
    #[error("Size mismatch in transfer handshake: {first} != {second}")]
    SizeMismatch { first: u32, second: u32 },

    #[error("Invalid response from device: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Core(err) => err.code(),
            Self::Transport(err) => err.code(),
            Self::Types(zkattend_types::Error::SizeMismatch { .. }) => ErrorCode::SizeMismatch,
            Self::Types(zkattend_types::Error::TooShort { .. }) => ErrorCode::MalformedFrame,
            Self::NotConnected => ErrorCode::NotConnected,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::ExecTimeout { .. } => ErrorCode::ExecTimeout,
            Self::SizeMismatch { .. } => ErrorCode::SizeMismatch,
            Self::InvalidResponse(_) => ErrorCode::ExecFailed,
        }
    }

    /// Human-readable message from the code table
    pub fn message(&self) -> String {
        match self.code() {
            ErrorCode::Unknown => format!("{}: {}", ErrorCode::Unknown.message(), self),
            code => code.message().to_string(),
        }
    }

    /// Check if the connection is unusable after this error
    ///
    /// Transport failures are fatal; protocol and data errors only fail the
    /// request that hit them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn test_codes() {
        let err = Error::from(zkattend_core::Error::Unauthorized);
        assert_eq!(err.code().as_str(), "UNAUTHORIZED");
        assert!(!err.is_fatal());

        let err = Error::ExecTimeout {
            command: Command::GetTime,
            timeout: Duration::from_millis(500),
        };
        assert_eq!(err.code().as_str(), "EXEC_TIMEOUT");
        assert!(err.to_string().contains("CMD_GET_TIME"));

        let err = Error::from(zkattend_types::Error::SizeMismatch {
            declared: 10,
            actual: 8,
        });
        assert_eq!(err.code(), ErrorCode::SizeMismatch);
    }

    #[test]
    fn test_transport_errors_are_fatal() {
        let err = Error::from(zkattend_transport::Error::from(io::Error::from(
            io::ErrorKind::ConnectionReset,
        )));

        assert!(err.is_fatal());
        assert_eq!(err.code().as_str(), "ECONNRESET");
        assert_eq!(err.message(), "Connection reset by the device");
    }

    #[test]
    fn test_unknown_message_fallback() {
        let err = Error::from(zkattend_transport::Error::from(io::Error::other("weird")));

        assert_eq!(err.code(), ErrorCode::Unknown);
        assert!(err.message().starts_with("Unknown Error: "));
        assert!(err.message().contains("weird"));
    }
}
