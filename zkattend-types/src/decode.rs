//! Fixed-layout record decoding

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Size of the length prefix in front of bulk content
pub const LENGTH_PREFIX: usize = 4;

/// A record stored in a fixed-size window
pub trait FixedRecord: Sized {
    /// Window size in bytes
    const SIZE: usize;

    /// Decode one record from a window of at least `SIZE` bytes
    fn decode(buf: &[u8]) -> Result<Self>;
}

/// Decode a length-prefixed list of fixed-size records
///
/// The first four bytes declare the length of what follows. Trailing bytes
/// that do not fill a whole record are dropped. Empty content yields an
/// empty list.
///
/// # Errors
///
/// `SizeMismatch` if the declared length differs from the bytes present.
///
/// # Examples
///
/// ```
/// use zkattend_types::{decode_list, User};
///
/// let mut content = 72u32.to_le_bytes().to_vec();
/// content.extend([0u8; 72]);
///
/// let users: Vec<User> = decode_list(&content).unwrap();
/// assert_eq!(users.len(), 1);
/// ```
pub fn decode_list<T: FixedRecord>(content: &[u8]) -> Result<Vec<T>> {
    if content.is_empty() {
        return Ok(Vec::new());
    }

    if content.len() < LENGTH_PREFIX {
        return Err(Error::TooShort {
            expected: LENGTH_PREFIX,
            actual: content.len(),
        });
    }

    let declared = LittleEndian::read_u32(content) as usize;
    let body = &content[LENGTH_PREFIX..];

    if declared != body.len() {
        return Err(Error::SizeMismatch {
            declared,
            actual: body.len(),
        });
    }

    body.chunks_exact(T::SIZE).map(T::decode).collect()
}

/// ASCII text field truncated at the first NUL
///
/// Without a NUL the whole field is used.
pub fn ascii_field(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

pub(crate) fn ensure_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() < expected {
        return Err(Error::TooShort {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    struct Pair(u8, u8);

    impl FixedRecord for Pair {
        const SIZE: usize = 2;

        fn decode(buf: &[u8]) -> Result<Self> {
            ensure_len(buf, Self::SIZE)?;
            Ok(Pair(buf[0], buf[1]))
        }
    }

    #[test]
    fn test_decode_list() {
        let content = [4, 0, 0, 0, 1, 2, 3, 4];
        let pairs: Vec<Pair> = decode_list(&content).unwrap();

        assert_eq!(pairs, vec![Pair(1, 2), Pair(3, 4)]);
    }

    #[test]
    fn test_decode_list_drops_partial_tail() {
        let content = [5, 0, 0, 0, 1, 2, 3, 4, 5];
        let pairs: Vec<Pair> = decode_list(&content).unwrap();

        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_decode_list_size_mismatch() {
        let content = [9, 0, 0, 0, 1, 2];
        let result = decode_list::<Pair>(&content);

        assert!(matches!(
            result,
            Err(Error::SizeMismatch { declared: 9, actual: 2 })
        ));
    }

    #[test]
    fn test_decode_list_empty() {
        assert!(decode_list::<Pair>(&[]).unwrap().is_empty());
        assert!(decode_list::<Pair>(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_list_short_prefix() {
        assert!(matches!(
            decode_list::<Pair>(&[1, 0]),
            Err(Error::TooShort { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_ascii_field() {
        assert_eq!(ascii_field(b"Alice\0\0\0"), "Alice");
        assert_eq!(ascii_field(b"Bob\0junk"), "Bob");
        assert_eq!(ascii_field(b"FULLWIDTH"), "FULLWIDTH");
        assert_eq!(ascii_field(b"\0abc"), "");
    }
}
