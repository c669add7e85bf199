//! Storage counters

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::{decode::ensure_len, error::Result};

/// Used, total and available storage slots
///
/// Decoded from the `CMD_GET_FREE_SIZES` reply, a block of 20 little-endian
/// u32 counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capacities {
    pub users: u32,
    pub fingerprints: u32,
    pub records: u32,
    pub cards: u32,
    pub user_capacity: u32,
    pub fingerprint_capacity: u32,
    pub record_capacity: u32,
    pub users_available: u32,
    pub fingerprints_available: u32,
    pub records_available: u32,
}

impl Capacities {
    /// Bytes covered by the counter block
    pub const SIZE: usize = 80;

    pub fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, Self::SIZE)?;

        let field = |offset: usize| LittleEndian::read_u32(&buf[offset..offset + 4]);

        Ok(Self {
            users: field(16),
            fingerprints: field(24),
            records: field(32),
            cards: field(48),
            fingerprint_capacity: field(56),
            user_capacity: field(60),
            record_capacity: field(64),
            fingerprints_available: field(68),
            users_available: field(72),
            records_available: field(76),
        })
    }
}

impl fmt::Display for Capacities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users {}/{}, fingerprints {}/{}, records {}/{}",
            self.users,
            self.user_capacity,
            self.fingerprints,
            self.fingerprint_capacity,
            self.records,
            self.record_capacity
        )
    }
}
