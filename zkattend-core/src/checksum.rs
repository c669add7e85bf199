//! Frame checksum
//!
//! The device sums the header and payload as little-endian 16-bit words:
//! 1. Build buffer: [Command, 0x00, 0x00, SessionID, RequestID, Payload]
//! 2. Add each word (a trailing odd byte is added as-is)
//! 3. Reduce the running sum modulo 65536 after every addition
//! 4. Return 65535 - sum (the ones-complement of the running sum)

use tracing::trace;

/// Calculate the checksum of a header+payload buffer
///
/// The checksum slot (bytes 2-3) must already be zeroed by the caller.
///
/// # Algorithm
///
/// ```text
/// sum = 0
/// for each little-endian u16 word w (odd tail byte b counts as b):
///     sum = (sum + w) mod 65536
/// return 65536 - sum - 1
/// ```
///
/// # Examples
///
/// ```
/// use zkattend_core::checksum;
///
/// // CMD_CONNECT header with every other field zeroed
/// let header = [0xE8, 0x03, 0, 0, 0, 0, 0, 0];
/// assert_eq!(checksum::calculate(&header), 0xFC17);
/// ```
pub fn calculate(buf: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    for chunk in buf.chunks(2) {
        let word = if chunk.len() == 2 {
            u16::from_le_bytes([chunk[0], chunk[1]]) as u32
        } else {
            // Odd byte - added as-is
            chunk[0] as u32
        };

        sum = (sum + word) % 0x1_0000;
    }

    let checksum = (0xFFFF - sum) as u16;

    trace!(
        len = buf.len(),
        checksum = format!("0x{:04X}", checksum),
        "Calculated checksum"
    );

    checksum
}

/// Verify a received header+payload buffer against its checksum field
///
/// The checksum slot is treated as zero while summing, mirroring how the
/// value was produced. Buffers shorter than a header never verify.
pub fn verify(buf: &[u8]) -> bool {
    if buf.len() < 4 {
        return false;
    }

    let received = u16::from_le_bytes([buf[2], buf[3]]);

    let mut zeroed = buf.to_vec();
    zeroed[2] = 0;
    zeroed[3] = 0;

    calculate(&zeroed) == received
}
