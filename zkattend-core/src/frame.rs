//! Frame structure and encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::ReplyCode,
    constants::{FRAME_HEADER_SIZE, HEADER_SIZE, MAGIC, PREFIX_SIZE},
    error::{Error, Result},
};

/// Protocol frame
///
/// # Frame Structure
///
/// ```text
/// ┌─────────────┬─────────┬──────────┬─────────────┬─────────────┬─────────────┬─────────────┬───────────┐
/// │    Magic    │  Size   │ Reserved │  Command    │  Checksum   │  SessionID  │  RequestID  │  Payload  │
/// │  50 50 82 7D│ 2 bytes │ 2 bytes  │   2 bytes   │   2 bytes   │   2 bytes   │   2 bytes   │  N bytes  │
/// │             │ (LE u16)│  (zero)  │  (LE u16)   │  (LE u16)   │  (LE u16)   │  (LE u16)   │           │
/// └─────────────┴─────────┴──────────┴─────────────┴─────────────┴─────────────┴─────────────┴───────────┘
/// ```
///
/// `Size` counts the 8-byte header plus the payload.
///
/// # Examples
///
/// ```
/// use zkattend_core::{Command, Frame, FrameHeader};
///
/// let frame = Frame::new(Command::Connect, 0, 0);
/// let encoded = frame.encode().unwrap();
///
/// let header = FrameHeader::decode(&encoded).unwrap();
/// assert_eq!(header.reply_code, 1000);
/// assert_eq!(header.size, 8);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command code (requests) or reply code (replies)
    pub command: u16,

    /// Session identifier (assigned by device on connect)
    pub session_id: u16,

    /// Request counter value the checksum covers
    pub request_id: u16,

    /// Frame payload (command-specific data)
    pub payload: Bytes,
}

impl Frame {
    /// Largest payload the 16-bit `size` field can describe
    pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - HEADER_SIZE;

    /// Create a new frame with empty payload
    pub fn new(command: impl Into<u16>, session_id: u16, request_id: u16) -> Self {
        Self {
            command: command.into(),
            session_id,
            request_id,
            payload: Bytes::new(),
        }
    }

    /// Create a frame with payload
    ///
    /// # Examples
    ///
    /// ```
    /// use zkattend_core::{Command, Frame};
    ///
    /// let frame = Frame::with_payload(Command::DataRdy, 1234, 7, vec![0; 8]);
    /// assert_eq!(frame.size(), 16);
    /// ```
    pub fn with_payload(
        command: impl Into<u16>,
        session_id: u16,
        request_id: u16,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            command: command.into(),
            session_id,
            request_id,
            payload: payload.into(),
        }
    }

    /// Header plus payload length (the value of the `size` field)
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Checksum over the header (checksum slot zeroed) and payload
    pub fn checksum(&self) -> u16 {
        let mut buf = BytesMut::with_capacity(self.size());
        self.put_header(&mut buf, 0, self.request_id);
        buf.put_slice(&self.payload);
        checksum::calculate(&buf)
    }

    /// Encode frame to wire bytes
    ///
    /// The checksum is computed with `request_id`, after which the request
    /// slot is patched with `request_id + 1` (mod 65536). Devices depend on
    /// this exact layout.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if the payload exceeds [`Frame::MAX_PAYLOAD_SIZE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use zkattend_core::{Command, Frame};
    ///
    /// let bytes = Frame::new(Command::Connect, 0, 0).encode().unwrap();
    /// assert_eq!(bytes.len(), 16);
    /// assert_eq!(&bytes[14..16], &[1, 0]);
    /// ```
    pub fn encode(&self) -> Result<BytesMut> {
        if self.payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: self.payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let size = self.size();
        let mut buf = BytesMut::with_capacity(PREFIX_SIZE + size);

        // Outer prefix
        buf.put_slice(&MAGIC);
        buf.put_u16_le(size as u16);
        buf.put_u16_le(0);

        // Header with the counter already advanced
        self.put_header(&mut buf, self.checksum(), self.request_id.wrapping_add(1));
        buf.put_slice(&self.payload);

        Ok(buf)
    }

    /// Decode a complete inbound frame
    ///
    /// `command` holds the reply code and `request_id` the reply id echoed
    /// by the device. The checksum is not verified here.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer does not start with the magic or is
    /// shorter than the size it declares.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let header = FrameHeader::decode(buf)?;
        let total = header.total_len();

        if buf.len() < total {
            return Err(Error::PacketTooShort {
                expected: total,
                actual: buf.len(),
            });
        }

        Ok(Self {
            command: header.reply_code,
            session_id: header.session_id,
            request_id: header.reply_id,
            payload: Bytes::copy_from_slice(&buf[FRAME_HEADER_SIZE..total]),
        })
    }

    fn put_header(&self, buf: &mut BytesMut, checksum: u16, request_id: u16) {
        buf.put_u16_le(self.command);
        buf.put_u16_le(checksum);
        buf.put_u16_le(self.session_id);
        buf.put_u16_le(request_id);
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &self.command)
            .field("session_id", &format!("0x{:04X}", self.session_id))
            .field("request_id", &format!("0x{:04X}", self.request_id))
            .field("checksum", &format!("0x{:04X}", self.checksum()))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[{}](session={}, request={}, len={})",
            self.command,
            self.session_id,
            self.request_id,
            self.payload.len()
        )
    }
}

/// Build ready-to-write bytes for a request
///
/// # Errors
///
/// `PayloadTooLarge` if the payload does not fit in one frame.
pub fn encode(
    command: impl Into<u16>,
    session_id: u16,
    request_id: u16,
    payload: &[u8],
) -> Result<BytesMut> {
    Frame::with_payload(command, session_id, request_id, Bytes::copy_from_slice(payload)).encode()
}

/// Fixed-offset header fields of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Header plus payload length
    pub size: u16,

    /// Reply code (or command code for outbound frames)
    pub reply_code: u16,

    /// Checksum field as transmitted
    pub checksum: u16,

    pub session_id: u16,

    /// Request/reply counter as transmitted
    pub reply_id: u16,
}

impl FrameHeader {
    /// Decode the header fields
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer does not start with the magic or is
    /// shorter than prefix plus header.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Err(Error::PacketTooShort {
                expected: FRAME_HEADER_SIZE,
                actual: buf.len(),
            });
        }

        if !is_frame(buf) {
            return Err(Error::MalformedFrame(format!(
                "missing frame magic: {}",
                hex::encode(&buf[..MAGIC.len()])
            )));
        }

        Ok(Self {
            size: read_u16(buf, 4),
            reply_code: read_u16(buf, 8),
            checksum: read_u16(buf, 10),
            session_id: read_u16(buf, 12),
            reply_id: read_u16(buf, 14),
        })
    }

    /// Classify the reply code
    pub fn reply(&self) -> Result<ReplyCode> {
        ReplyCode::try_from(self.reply_code)
    }

    /// Total on-wire length: prefix plus `size`
    ///
    /// A `size` smaller than the header is treated as a bare header.
    pub fn total_len(&self) -> usize {
        PREFIX_SIZE + (self.size as usize).max(HEADER_SIZE)
    }

    /// Declared content length (payload after the header)
    pub fn content_len(&self) -> usize {
        (self.size as usize).saturating_sub(HEADER_SIZE)
    }
}

/// One inbound unit as seen by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Starts with a decodable frame header
    Frame {
        header: FrameHeader,
        bytes: &'a [u8],
    },

    /// Raw bytes with no header in front
    Continuation(&'a [u8]),
}

impl<'a> Inbound<'a> {
    /// Classify a buffer as a frame or a headerless continuation
    pub fn classify(buf: &'a [u8]) -> Self {
        match FrameHeader::decode(buf) {
            Ok(header) => Self::Frame { header, bytes: buf },
            Err(_) => Self::Continuation(buf),
        }
    }
}

/// True iff the buffer starts with the frame magic
pub fn is_frame(buf: &[u8]) -> bool {
    buf.len() >= MAGIC.len() && buf[..MAGIC.len()] == MAGIC
}

/// True iff the buffer could be the first bytes of a frame magic
pub fn is_partial_magic(buf: &[u8]) -> bool {
    buf.len() < MAGIC.len() && MAGIC.starts_with(buf)
}

/// Content of a frame with prefix and header stripped
///
/// Buffers that are not frames are returned unchanged.
pub fn content(buf: &[u8]) -> &[u8] {
    if is_frame(buf) && buf.len() >= FRAME_HEADER_SIZE {
        &buf[FRAME_HEADER_SIZE..]
    } else {
        buf
    }
}

/// Offset of the first frame magic at or after `from`
pub fn find_magic(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }

    buf[from..]
        .windows(MAGIC.len())
        .position(|window| window == MAGIC)
        .map(|pos| pos + from)
}

/// Check the checksum of a complete inbound frame
pub fn verify_checksum(buf: &[u8]) -> Result<()> {
    let header = FrameHeader::decode(buf)?;
    let total = header.total_len().min(buf.len());
    let body = &buf[PREFIX_SIZE..total];

    if checksum::verify(body) {
        return Ok(());
    }

    let mut zeroed = body.to_vec();
    zeroed[2] = 0;
    zeroed[3] = 0;

    Err(Error::ChecksumMismatch {
        expected: checksum::calculate(&zeroed),
        received: header.checksum,
    })
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}
