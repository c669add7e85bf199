//! Transport errors

use std::io;

use zkattend_core::ErrorCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Stable code, using socket error names where one applies
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConnected => ErrorCode::NotConnected,
            Self::AlreadyConnected => ErrorCode::AlreadyConnected,
            Self::ConnectionTimeout => ErrorCode::ConnectionTimeout,
            Self::ReadTimeout => ErrorCode::ExecTimeout,
            Self::ConnectionClosed => ErrorCode::ConnectionClosed,
            Self::InvalidAddress(_) => ErrorCode::HostNotFound,
            Self::Io(err) => match err.kind() {
                io::ErrorKind::ConnectionRefused => ErrorCode::ConnectionRefused,
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => ErrorCode::ConnectionReset,
                io::ErrorKind::TimedOut => ErrorCode::ConnectionTimeout,
                io::ErrorKind::UnexpectedEof => ErrorCode::ConnectionClosed,
                io::ErrorKind::NotConnected => ErrorCode::NotConnected,
                _ => ErrorCode::Unknown,
            },
        }
    }

    /// Underlying OS error number, if any
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::Io(err) => err.raw_os_error(),
            _ => None,
        }
    }
}
