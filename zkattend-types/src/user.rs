//! User records

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    decode::{ascii_field, ensure_len, FixedRecord},
    error::Result,
};

/// Permission token of a device administrator
pub const PERMISSION_ADMIN: u8 = 14;

/// User enrolled on the device
///
/// # Record Layout (72 bytes)
///
/// ```text
/// 0   id            u16
/// 2   permission    u8
/// 3   password      8 bytes, NUL padded
/// 11  name          24 bytes, NUL padded
/// 35  card number   u32
/// 39  group         u8
/// 40  timezone flag u16
/// 42  timezones     3 x u16
/// 48  user id       9 bytes, NUL padded
/// 57  reserved
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Internal id
    pub id: u16,

    /// Permission token
    pub permission: u8,

    pub password: String,

    pub name: String,

    pub card_no: u32,

    pub group_no: u8,

    /// Whether the user's own timezones apply instead of the group's
    pub tz_flag: u16,

    pub timezones: [u16; 3],

    /// User id entered on the device
    pub user_id: String,
}

impl User {
    /// Check if the user administers the device
    pub fn is_admin(&self) -> bool {
        self.permission == PERMISSION_ADMIN
    }
}

impl FixedRecord for User {
    const SIZE: usize = 72;

    fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, Self::SIZE)?;

        Ok(Self {
            id: LittleEndian::read_u16(&buf[0..2]),
            permission: buf[2],
            password: ascii_field(&buf[3..11]),
            name: ascii_field(&buf[11..35]),
            card_no: LittleEndian::read_u32(&buf[35..39]),
            group_no: buf[39],
            tz_flag: LittleEndian::read_u16(&buf[40..42]),
            timezones: [
                LittleEndian::read_u16(&buf[42..44]),
                LittleEndian::read_u16(&buf[44..46]),
                LittleEndian::read_u16(&buf[46..48]),
            ],
            user_id: ascii_field(&buf[48..57]),
        })
    }
}
