//! Attendance records

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    decode::{ascii_field, ensure_len, FixedRecord},
    error::Result,
    time::PackedTime,
};

/// How the user proved their identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyMethod {
    Password,
    Fingerprint,
    Card,
    Other(u8),
}

impl From<u8> for VerifyMethod {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Password,
            1 => Self::Fingerprint,
            2 => Self::Card,
            other => Self::Other(other),
        }
    }
}

impl From<VerifyMethod> for u8 {
    fn from(method: VerifyMethod) -> u8 {
        match method {
            VerifyMethod::Password => 0,
            VerifyMethod::Fingerprint => 1,
            VerifyMethod::Card => 2,
            VerifyMethod::Other(value) => value,
        }
    }
}

/// Punch state chosen on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyState {
    CheckIn,
    CheckOut,
    BreakOut,
    BreakIn,
    OvertimeIn,
    OvertimeOut,
    Other(u8),
}

impl From<u8> for VerifyState {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::CheckIn,
            1 => Self::CheckOut,
            2 => Self::BreakOut,
            3 => Self::BreakIn,
            4 => Self::OvertimeIn,
            5 => Self::OvertimeOut,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for VerifyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckIn => f.write_str("check-in"),
            Self::CheckOut => f.write_str("check-out"),
            Self::BreakOut => f.write_str("break-out"),
            Self::BreakIn => f.write_str("break-in"),
            Self::OvertimeIn => f.write_str("overtime-in"),
            Self::OvertimeOut => f.write_str("overtime-out"),
            Self::Other(value) => write!(f, "state-{value}"),
        }
    }
}

/// One attendance punch
///
/// # Record Layout (40 bytes)
///
/// ```text
/// 0   id            u16
/// 2   user id       9 bytes, NUL padded (24-byte field)
/// 26  verify method u8
/// 27  timestamp     u32, packed
/// 31  verify state  u8
/// 32  reserved
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Record id on some firmware, internal user id on others
    pub id: u16,

    pub user_id: String,

    pub verify_method: VerifyMethod,

    pub timestamp: PackedTime,

    pub verify_state: VerifyState,
}

impl FixedRecord for AttendanceRecord {
    const SIZE: usize = 40;

    fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, Self::SIZE)?;

        Ok(Self {
            id: LittleEndian::read_u16(&buf[0..2]),
            user_id: ascii_field(&buf[2..11]),
            verify_method: VerifyMethod::from(buf[26]),
            timestamp: PackedTime::new(LittleEndian::read_u32(&buf[27..31])),
            verify_state: VerifyState::from(buf[31]),
        })
    }
}
