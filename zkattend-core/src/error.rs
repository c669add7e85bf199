//! Error types for zkattend-core

use std::fmt;

use crate::command::ReplyCode;

/// Result type alias for zkattend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes shared by every layer
///
/// Each code has a fixed string form and a static human-readable message.
/// Socket-level codes keep the names the operating system uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unknown,
    ExecFailed,
    ExecTimeout,
    InvalidReplyCode,
    NoSession,
    Unauthorized,
    UnknownCommand,
    DeviceError,
    SizeMismatch,
    MalformedFrame,
    PayloadTooLarge,
    ChecksumMismatch,
    UnexpectedData,
    InvalidSessionState,
    NotConnected,
    AlreadyConnected,
    Cancelled,
    ConnectionRefused,
    ConnectionReset,
    ConnectionClosed,
    ConnectionTimeout,
    HostNotFound,
}

impl ErrorCode {
    /// Stable string form of the code
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::ExecFailed => "EXEC_FAILED",
            Self::ExecTimeout => "EXEC_TIMEOUT",
            Self::InvalidReplyCode => "INVALID_REPLY_CODE",
            Self::NoSession => "NO_SESSION",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::DeviceError => "DEVICE_ERROR",
            Self::SizeMismatch => "SIZE_MISMATCH",
            Self::MalformedFrame => "MALFORMED_FRAME",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::ChecksumMismatch => "CHECKSUM_MISMATCH",
            Self::UnexpectedData => "UNEXPECTED_DATA",
            Self::InvalidSessionState => "INVALID_SESSION_STATE",
            Self::NotConnected => "NOT_CONNECTED",
            Self::AlreadyConnected => "ALREADY_CONNECTED",
            Self::Cancelled => "CANCELLED",
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::ConnectionReset => "ECONNRESET",
            Self::ConnectionClosed => "ECONNCLOSED",
            Self::ConnectionTimeout => "ETIMEDOUT",
            Self::HostNotFound => "ENOTFOUND",
        }
    }

    /// Human-readable message for the code
    pub fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown Error",
            Self::ExecFailed => "Unable to execute command on the device",
            Self::ExecTimeout => "Timed out waiting for the device to reply",
            Self::InvalidReplyCode => "Reply code is not valid",
            Self::NoSession => "Session ID not found in reply message",
            Self::Unauthorized => "Connection is not authorized by the device",
            Self::UnknownCommand => "Device does not recognise the command",
            Self::DeviceError => "Device failed to process the request",
            Self::SizeMismatch => "Declared data size does not match the data received",
            Self::MalformedFrame => "Reply frame is malformed",
            Self::PayloadTooLarge => "Request payload does not fit in one frame",
            Self::ChecksumMismatch => "Reply checksum does not match its contents",
            Self::UnexpectedData => "Received data outside of any reply frame",
            Self::InvalidSessionState => "Operation is not valid in the current session state",
            Self::NotConnected => "Device is not connected",
            Self::AlreadyConnected => "Device is already connected",
            Self::Cancelled => "Request was cancelled by a disconnect",
            Self::ConnectionRefused => "Connection refused by the device",
            Self::ConnectionReset => "Connection reset by the device",
            Self::ConnectionClosed => "Connection closed by the device",
            Self::ConnectionTimeout => "Timed out connecting to the device",
            Self::HostNotFound => "Device address could not be resolved",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    PacketTooShort {
        expected: usize,
        actual: usize,
    },

    /// Bytes do not form a frame
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Payload too large for the 16-bit size field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Reply code outside the known table
    #[error("Invalid reply code: {0}")]
    InvalidReplyCode(u16),

    /// Device refused the session
    #[error("Unauthorized - device rejected the request")]
    Unauthorized,

    /// Device does not know the command
    #[error("Unknown command - device did not recognise the request")]
    UnknownCommand,

    /// Device returned an error reply
    #[error("Device returned error: {reply}")]
    DeviceError {
        reply: ReplyCode,
    },

    /// Headerless bytes arrived with no transfer in progress
    #[error("Unexpected data: {len} bytes outside of any reply frame")]
    UnexpectedData {
        len: usize,
    },

    /// Connect handshake returned a zero session id
    #[error("No session - device did not assign a session id")]
    NoSession,

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),
}

impl Error {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PacketTooShort { .. } | Self::MalformedFrame(_) => ErrorCode::MalformedFrame,
            Self::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            Self::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            Self::InvalidReplyCode(_) => ErrorCode::InvalidReplyCode,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::UnknownCommand => ErrorCode::UnknownCommand,
            Self::DeviceError { .. } => ErrorCode::DeviceError,
            Self::UnexpectedData { .. } => ErrorCode::UnexpectedData,
            Self::NoSession => ErrorCode::NoSession,
            Self::InvalidSessionState(_) => ErrorCode::InvalidSessionState,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidReplyCode(42).code(), ErrorCode::InvalidReplyCode);
        assert_eq!(Error::NoSession.code().as_str(), "NO_SESSION");
        assert_eq!(
            Error::DeviceError { reply: ReplyCode::AckError }.code(),
            ErrorCode::DeviceError
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ErrorCode::Unknown.message(), "Unknown Error");
        assert_eq!(
            ErrorCode::InvalidReplyCode.message(),
            "Reply code is not valid"
        );
        assert_eq!(ErrorCode::ConnectionRefused.to_string(), "ECONNREFUSED");
    }

    #[test]
    fn test_error_context_in_display() {
        let err = Error::InvalidReplyCode(1234);
        assert!(err.to_string().contains("1234"));
    }
}
