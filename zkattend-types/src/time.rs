//! Device timestamps

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

const MINUTE: u32 = 60;
const HOUR: u32 = 60 * MINUTE;
const DAY: u32 = 24 * HOUR;
const MONTH: u32 = 31 * DAY;
const YEAR: u32 = 12 * MONTH;

/// Timestamp in the device's packed form
///
/// The device stores time as a mixed-radix count where every month has 31
/// days. Decoding follows that convention exactly, so values that are not
/// real calendar dates (31 February) can be represented.
///
/// # Examples
///
/// ```
/// use zkattend_types::PackedTime;
///
/// assert_eq!(PackedTime::new(0).to_string(), "2000-01-01 00:00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PackedTime(u32);

impl PackedTime {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw packed value
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn year(self) -> u32 {
        2000 + self.0 / YEAR
    }

    /// 1-12
    pub fn month(self) -> u32 {
        (self.0 / MONTH) % 12 + 1
    }

    /// 1-31
    pub fn day(self) -> u32 {
        (self.0 / DAY) % 31 + 1
    }

    pub fn hour(self) -> u32 {
        (self.0 / HOUR) % 24
    }

    pub fn minute(self) -> u32 {
        (self.0 / MINUTE) % 60
    }

    pub fn second(self) -> u32 {
        self.0 % 60
    }

    /// Calendar date-time, or `None` if the day does not exist
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year() as i32, self.month(), self.day())?.and_hms_opt(
            self.hour(),
            self.minute(),
            self.second(),
        )
    }
}

impl From<u32> for PackedTime {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PackedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}
