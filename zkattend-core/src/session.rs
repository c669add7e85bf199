//! Session management for the attendance protocol
//!
//! A session ties a connection to a request sequence:
//! - Session ID (assigned by device on connect, 0 until then)
//! - Request counter (advances per command once a session exists)

use std::fmt;

use crate::error::{Error, Result};

/// Connection lifecycle
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Open -> Closing -> Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No socket
    #[default]
    Disconnected,

    /// TCP connect in progress
    Connecting,

    /// Socket up, no protocol session
    Connected,

    /// Protocol session established
    Open,

    /// Socket shutdown in progress
    Closing,
}

impl ConnectionState {
    /// Check if a socket exists in this state
    pub fn has_socket(self) -> bool {
        matches!(self, Self::Connected | Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Open => "open",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Session counters
///
/// A plain value owned by whoever owns the connection; each connection
/// carries its own.
///
/// # Examples
///
/// ```
/// use zkattend_core::Session;
///
/// let mut session = Session::new();
/// assert_eq!(session.begin_request(), (0, 0));
///
/// session.open(1234).unwrap();
/// assert_eq!(session.begin_request(), (1234, 1));
/// assert_eq!(session.begin_request(), (1234, 2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    session_id: u16,
    request_id: u16,
}

impl Session {
    /// Create a session with both counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session ID (0 when no session)
    pub fn session_id(&self) -> u16 {
        self.session_id
    }

    /// Last request ID handed out
    pub fn request_id(&self) -> u16 {
        self.request_id
    }

    /// Check if the device has assigned a session
    pub fn is_open(&self) -> bool {
        self.session_id != 0
    }

    /// Counters for the next request
    ///
    /// The request counter only advances once a session exists; before
    /// that both values stay pinned at zero.
    pub fn begin_request(&mut self) -> (u16, u16) {
        if self.is_open() {
            self.request_id = self.request_id.wrapping_add(1);
        }

        (self.session_id, self.request_id)
    }

    /// Adopt the session ID returned by the connect handshake
    ///
    /// # Errors
    ///
    /// `NoSession` if the device answered with a zero ID,
    /// `InvalidSessionState` if a session is already open.
    pub fn open(&mut self, session_id: u16) -> Result<()> {
        if self.is_open() {
            return Err(Error::InvalidSessionState(format!(
                "session {} already open",
                self.session_id
            )));
        }

        if session_id == 0 {
            return Err(Error::NoSession);
        }

        self.session_id = session_id;
        self.request_id = 0;

        Ok(())
    }

    /// Forget the session and reset both counters
    pub fn close(&mut self) {
        *self = Self::default();
    }
}
