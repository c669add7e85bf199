//! Protocol constants

/// Frame start sentinel
pub const MAGIC: [u8; 4] = [0x50, 0x50, 0x82, 0x7D];

/// Outer prefix size: magic(4) + size(2) + reserved(2)
pub const PREFIX_SIZE: usize = 8;

/// Inner header size: command(2) + checksum(2) + session(2) + request(2)
pub const HEADER_SIZE: usize = 8;

/// Prefix and header together; content starts at this offset
pub const FRAME_HEADER_SIZE: usize = PREFIX_SIZE + HEADER_SIZE;

/// Default device port
pub const DEFAULT_PORT: u16 = 4370;

/// Default per-call inactivity timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default TCP connect timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Socket read buffer size
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Sub-request payloads passed to `CMD_DATA_WRRQ`
pub mod requests {
    /// Fetch user records
    pub const USERS: [u8; 11] = [0x01, 0x09, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

    /// Fetch attendance records
    pub const ATTENDANCE_RECORDS: [u8; 11] =
        [0x01, 0x0d, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
}

