//! Record types decoded from device replies
//!
//! All decoders are pure functions over fixed-size byte windows.

pub mod capacity;
pub mod decode;
pub mod error;
pub mod record;
pub mod time;
pub mod user;

pub use capacity::Capacities;
pub use decode::{ascii_field, decode_list, FixedRecord};
pub use error::{Error, Result};
pub use record::{AttendanceRecord, VerifyMethod, VerifyState};
pub use time::PackedTime;
pub use user::User;
