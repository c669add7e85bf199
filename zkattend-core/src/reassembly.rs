//! Reply reassembly
//!
//! Devices are inconsistent about how a reply is split across socket reads:
//!
//! - small replies arrive inline in a single `ACK_OK`
//! - bulk replies arrive as `PREPARE_DATA`, one or more `DATA` frames, then
//!   usually `ACK_OK`; the reply is complete once the announced size is in
//! - a `DATA` frame may be cut across reads with no header repeated
//! - a fresh header may start in the middle of a read
//!
//! [`Reassembler`] is a pure state machine. Feed it every chunk read from the
//! socket; it reports [`Progress::Complete`] once one logical reply is
//! assembled.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::{
    command::ReplyCode,
    constants::FRAME_HEADER_SIZE,
    error::{Error, Result},
    frame::{self, FrameHeader, Inbound},
};

/// Bytes needed to read a reply code from a frame start
const REPLY_CODE_END: usize = 10;

/// A fully reassembled reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Content collected from `DATA` frames (headers stripped)
    Data(Bytes),

    /// A complete `ACK_OK`/`ACK_DATA` frame, header included
    ///
    /// Some commands carry their result inline in the ack.
    Ack(Bytes),
}

impl Reply {
    /// Content with any frame header stripped
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Data(content) => content,
            Self::Ack(raw) => frame::content(raw),
        }
    }

    /// Owned content with any frame header stripped
    pub fn into_payload(self) -> Bytes {
        match self {
            Self::Data(content) => content,
            Self::Ack(raw) if raw.len() >= FRAME_HEADER_SIZE => raw.slice(FRAME_HEADER_SIZE..),
            Self::Ack(raw) => raw,
        }
    }

    /// The raw ack frame, if this reply is one
    pub fn frame(&self) -> Option<&[u8]> {
        match self {
            Self::Ack(raw) => Some(raw),
            Self::Data(_) => None,
        }
    }
}

/// Result of feeding one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// More bytes are needed
    Pending,

    /// One reply is complete
    Complete(Reply),
}

enum Step {
    Wait,
    Continue,
    Done(Reply),
}

/// Reassembly state for one request
///
/// # Examples
///
/// ```
/// use zkattend_core::{frame, Progress, Reassembler, Reply, ReplyCode};
///
/// let ack = frame::encode(ReplyCode::AckOk, 1, 1, b"Ver 6.60").unwrap();
///
/// let mut reassembler = Reassembler::new();
/// let progress = reassembler.feed(&ack[..5]).unwrap();
/// assert_eq!(progress, Progress::Pending);
///
/// match reassembler.feed(&ack[5..]).unwrap() {
///     Progress::Complete(reply) => assert_eq!(reply.payload(), b"Ver 6.60"),
///     Progress::Pending => unreachable!(),
/// }
/// ```
#[derive(Debug, Default)]
pub struct Reassembler {
    /// Raw bytes not yet turned into content
    accumulator: BytesMut,

    /// Content size announced by `PREPARE_DATA`
    expected_size: Option<usize>,

    /// Header-stripped content collected so far
    content: BytesMut,

    /// Accumulator prefix already searched for embedded frames
    scanned: usize,

    verify_checksums: bool,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject reply frames whose checksum does not match
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksums = enabled;
        self
    }

    /// Content size announced for the current transfer
    pub fn expected_size(&self) -> Option<usize> {
        self.expected_size
    }

    /// Bytes received but not yet consumed
    pub fn buffered(&self) -> usize {
        self.accumulator.len()
    }

    /// Content collected so far
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Check if nothing has been received since the last reset
    pub fn is_idle(&self) -> bool {
        self.accumulator.is_empty() && self.content.is_empty() && self.expected_size.is_none()
    }

    /// Drop all partial state
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.content.clear();
        self.expected_size = None;
        self.scanned = 0;
    }

    /// Feed one chunk read from the socket
    ///
    /// # Errors
    ///
    /// A chunk starting with a rejection reply code fails at once, whatever
    /// has been accumulated. Unknown reply codes, unframed bytes outside a
    /// transfer and (when enabled) checksum mismatches also fail.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Progress> {
        if chunk.is_empty() {
            return Ok(Progress::Pending);
        }

        trace!(len = chunk.len(), bytes = %hex::encode(&chunk[..chunk.len().min(64)]), "Received chunk");

        if frame::is_frame(chunk) && chunk.len() >= REPLY_CODE_END {
            let code = u16::from_le_bytes([chunk[8], chunk[9]]);
            let reply = ReplyCode::try_from(code)?;

            if let Some(err) = reply.rejection() {
                debug!(reply = %reply, "Device rejected request");
                self.reset();
                return Err(err);
            }
        }

        self.accumulator.extend_from_slice(chunk);

        let progress = self.drain();
        if progress.is_err() {
            self.reset();
        }
        progress
    }

    fn drain(&mut self) -> Result<Progress> {
        loop {
            if self.accumulator.is_empty() {
                return Ok(Progress::Pending);
            }

            let header = match Inbound::classify(&self.accumulator) {
                Inbound::Frame { header, .. } => Some(header),
                Inbound::Continuation(bytes)
                    if frame::is_frame(bytes) || frame::is_partial_magic(bytes) =>
                {
                    // Header not complete yet
                    return Ok(Progress::Pending);
                }
                Inbound::Continuation(_) => None,
            };

            let step = match header {
                Some(header) => self.frame_step(header)?,
                None => self.continuation_step()?,
            };

            match step {
                Step::Wait => return Ok(Progress::Pending),
                Step::Continue => continue,
                Step::Done(reply) => {
                    if !self.accumulator.is_empty() {
                        debug!(len = self.accumulator.len(), "Discarding bytes after reply");
                    }
                    self.reset();
                    return Ok(Progress::Complete(reply));
                }
            }
        }
    }

    /// Accumulator starts with a full header
    fn frame_step(&mut self, header: FrameHeader) -> Result<Step> {
        let total = header.total_len();

        if let Some(split) = self.embedded_frame(FRAME_HEADER_SIZE, total) {
            warn!(
                reply = header.reply_code,
                declared = total,
                received = split,
                "Frame cut short by a new header"
            );

            let partial = self.take(split);
            if header.reply_code == u16::from(ReplyCode::Data) {
                self.content.extend_from_slice(&partial[FRAME_HEADER_SIZE..]);
            }
            return Ok(self.collected());
        }

        if self.accumulator.len() < total {
            trace!(
                have = self.accumulator.len(),
                need = total,
                "Waiting for rest of frame"
            );
            return Ok(Step::Wait);
        }

        let unit = self.take(total).freeze();

        Ok(match self.on_frame(header, unit)? {
            Some(reply) => Step::Done(reply),
            None => Step::Continue,
        })
    }

    /// One complete frame
    fn on_frame(&mut self, header: FrameHeader, unit: Bytes) -> Result<Option<Reply>> {
        if self.verify_checksums {
            frame::verify_checksum(&unit)?;
        }

        let reply = header.reply()?;

        if let Some(err) = reply.rejection() {
            return Err(err);
        }

        match reply {
            reply if reply.is_success() => {
                if self.content.is_empty() {
                    debug!(reply = %reply, len = unit.len(), "Inline reply");
                    Ok(Some(Reply::Ack(unit)))
                } else {
                    debug!(len = self.content.len(), "Transfer complete");
                    Ok(Some(Reply::Data(self.content.split().freeze())))
                }
            }

            ReplyCode::PrepareData => {
                let body = &unit[FRAME_HEADER_SIZE..];
                if body.len() < 4 {
                    return Err(Error::PacketTooShort {
                        expected: FRAME_HEADER_SIZE + 4,
                        actual: unit.len(),
                    });
                }

                let size = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
                debug!(size, "Bulk transfer announced");
                self.expected_size = Some(size);
                Ok(None)
            }

            ReplyCode::Data => {
                let body = unit.slice(FRAME_HEADER_SIZE..);

                if self.expected_size.is_none() && self.content.is_empty() {
                    debug!(len = body.len(), "Self-contained data frame");
                    return Ok(Some(Reply::Data(body)));
                }

                self.content.extend_from_slice(&body);
                trace!(
                    have = self.content.len(),
                    expected = ?self.expected_size,
                    "Data chunk"
                );
                Ok(self.finished())
            }

            // Rejections returned above
            _ => Err(Error::DeviceError { reply }),
        }
    }

    /// Accumulator holds headerless continuation bytes
    fn continuation_step(&mut self) -> Result<Step> {
        let Some(expected) = self.expected_size else {
            return Err(Error::UnexpectedData {
                len: self.accumulator.len(),
            });
        };

        let remaining = expected.saturating_sub(self.content.len());

        if remaining == 0 {
            // Zero-size announcement: nothing to collect, skip to the next frame
            return Ok(match self.embedded_frame(1, usize::MAX) {
                Some(split) => {
                    warn!(len = split, "Skipping bytes after completed transfer");
                    self.take(split);
                    Step::Continue
                }
                None => Step::Wait,
            });
        }

        // Nothing collected yet: the window spans the whole announced size.
        // Otherwise only what is still missing.
        let need = if self.content.is_empty() {
            expected + FRAME_HEADER_SIZE
        } else {
            remaining + FRAME_HEADER_SIZE
        };

        if let Some(split) = self.embedded_frame(1, need) {
            warn!(
                need,
                received = split,
                "Continuation cut short by a new header"
            );

            let partial = self.take(split);
            if partial.len() > FRAME_HEADER_SIZE {
                self.content.extend_from_slice(&partial[FRAME_HEADER_SIZE..]);
            }
            return Ok(self.collected());
        }

        if self.accumulator.len() < need {
            trace!(have = self.accumulator.len(), need, "Waiting for continuation");
            return Ok(Step::Wait);
        }

        let unit = self.take(need);
        self.content.extend_from_slice(&unit[FRAME_HEADER_SIZE..]);
        debug!(
            have = self.content.len(),
            expected,
            left = self.accumulator.len(),
            "Continuation window"
        );

        Ok(self.collected())
    }

    /// Announced content fully collected
    ///
    /// A trailing `ACK_OK` in the same read is dropped with the other
    /// leftover bytes.
    fn finished(&mut self) -> Option<Reply> {
        let expected = self.expected_size?;
        if self.content.len() < expected {
            return None;
        }

        debug!(len = self.content.len(), expected, "Transfer complete");
        Some(Reply::Data(self.content.split().freeze()))
    }

    fn collected(&mut self) -> Step {
        match self.finished() {
            Some(reply) => Step::Done(reply),
            None => Step::Continue,
        }
    }

    /// Offset of a frame starting inside `[from, end)` of the accumulator
    ///
    /// Only a magic followed by a known reply code counts.
    fn embedded_frame(&mut self, from: usize, end: usize) -> Option<usize> {
        let mut pos = from.max(self.scanned);

        while let Some(found) = frame::find_magic(&self.accumulator, pos) {
            if found >= end {
                return None;
            }

            match self.accumulator.get(found + 8..found + REPLY_CODE_END) {
                Some(code) => {
                    if ReplyCode::try_from(u16::from_le_bytes([code[0], code[1]])).is_ok() {
                        return Some(found);
                    }
                }
                // Code not here yet, look again on the next chunk
                None => return None,
            }

            pos = found + 1;
        }

        self.scanned = self.accumulator.len().saturating_sub(REPLY_CODE_END - 1);
        None
    }

    fn take(&mut self, len: usize) -> BytesMut {
        self.scanned = 0;
        self.accumulator.split_to(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAGIC;
    use bytes::BufMut;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn reply(code: ReplyCode, payload: &[u8]) -> Vec<u8> {
        frame::encode(code, 0x2A, 3, payload).unwrap().to_vec()
    }

    fn prepare(size: usize) -> Vec<u8> {
        reply(ReplyCode::PrepareData, &(size as u32).to_le_bytes())
    }

    fn ack() -> Vec<u8> {
        reply(ReplyCode::AckOk, &[])
    }

    /// Payload bytes that never contain the frame magic
    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 0x40) as u8).collect()
    }

    fn complete(progress: Progress) -> Reply {
        match progress {
            Progress::Complete(reply) => reply,
            Progress::Pending => panic!("reply not complete"),
        }
    }

    fn feed_all(reassembler: &mut Reassembler, chunks: &[&[u8]]) -> Result<Progress> {
        let mut last = Progress::Pending;
        for chunk in chunks {
            last = reassembler.feed(chunk)?;
        }
        Ok(last)
    }

    #[test]
    fn test_inline_ack() {
        let ack = reply(ReplyCode::AckOk, b"~ZKFPVersion=10");
        let mut reassembler = Reassembler::new();

        let reply = complete(reassembler.feed(&ack).unwrap());

        assert_eq!(reply, Reply::Ack(Bytes::from(ack.clone())));
        assert_eq!(reply.payload(), b"~ZKFPVersion=10");
        assert!(reassembler.is_idle());
    }

    #[test]
    fn test_ack_data_is_success() {
        let ack = reply(ReplyCode::AckData, &[1, 2, 3]);
        let reply = complete(Reassembler::new().feed(&ack).unwrap());

        assert_eq!(reply.into_payload().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn test_prepare_data_ack_single_chunk() {
        let body = payload(100);
        let mut stream = prepare(100);
        stream.extend(reply(ReplyCode::Data, &body));
        stream.extend(ack());

        let mut reassembler = Reassembler::new();
        let reply = complete(reassembler.feed(&stream).unwrap());

        assert_eq!(reply, Reply::Data(Bytes::from(body)));
        // The closing ack went out with the leftovers
        assert!(reassembler.is_idle());
    }

    #[test]
    fn test_announced_transfer_completes_without_ack() {
        let body = payload(100);
        let data = reply(ReplyCode::Data, &body);
        let mut reassembler = Reassembler::new();

        assert_eq!(reassembler.feed(&prepare(100)).unwrap(), Progress::Pending);
        assert_eq!(reassembler.expected_size(), Some(100));

        let reply = complete(reassembler.feed(&data).unwrap());
        assert_eq!(reply, Reply::Data(Bytes::from(body)));
        assert!(reassembler.is_idle());
    }

    #[test]
    fn test_short_transfer_ends_on_ack() {
        // Device announces more than it sends
        let body = payload(60);
        let mut reassembler = Reassembler::new();

        reassembler.feed(&prepare(100)).unwrap();
        assert_eq!(
            reassembler.feed(&reply(ReplyCode::Data, &body)).unwrap(),
            Progress::Pending
        );

        let reply = complete(reassembler.feed(&ack()).unwrap());
        assert_eq!(reply.payload(), body.as_slice());
    }

    #[test]
    fn test_multiple_data_frames() {
        let body = payload(300);
        let mut reassembler = Reassembler::new();

        let progress = feed_all(
            &mut reassembler,
            &[&prepare(300), &reply(ReplyCode::Data, &body[..100])],
        )
        .unwrap();
        assert_eq!(progress, Progress::Pending);
        assert_eq!(reassembler.content_len(), 100);

        let progress = reassembler.feed(&reply(ReplyCode::Data, &body[100..])).unwrap();
        assert_eq!(complete(progress).payload(), body.as_slice());
    }

    #[test]
    fn test_self_contained_data() {
        let body = payload(40);
        let data = reply(ReplyCode::Data, &body);

        let reply = complete(Reassembler::new().feed(&data).unwrap());

        assert_eq!(reply, Reply::Data(Bytes::from(body)));
    }

    #[test]
    fn test_unannounced_data_split_without_header() {
        let body = payload(200);
        let data = reply(ReplyCode::Data, &body);
        let mut reassembler = Reassembler::new();

        assert_eq!(reassembler.feed(&data[..50]).unwrap(), Progress::Pending);
        assert_eq!(reassembler.feed(&data[50..150]).unwrap(), Progress::Pending);

        let reply = complete(reassembler.feed(&data[150..]).unwrap());
        assert_eq!(reply.payload(), body.as_slice());
    }

    #[test]
    fn test_every_split_point() {
        let body = payload(48);
        let mut stream = prepare(48);
        stream.extend(reply(ReplyCode::Data, &body));
        stream.extend(ack());

        // Content is complete where the DATA frame ends
        let data_end = stream.len() - ack().len();

        for split in 1..stream.len() {
            let mut reassembler = Reassembler::new();

            let reply = match reassembler.feed(&stream[..split]).unwrap() {
                Progress::Complete(reply) => {
                    assert!(split >= data_end, "resolved early at {split}");
                    reply
                }
                Progress::Pending => {
                    assert!(split < data_end, "missed completion at {split}");
                    complete(reassembler.feed(&stream[split..]).unwrap())
                }
            };
            assert_eq!(reply.payload(), body.as_slice(), "split at {split}");
        }
    }

    #[test]
    fn test_split_inside_ack_header() {
        let mut reassembler = Reassembler::new();
        let ack = reply(ReplyCode::AckOk, &[9, 9]);

        assert_eq!(reassembler.feed(&ack[..2]).unwrap(), Progress::Pending);
        assert_eq!(reassembler.feed(&ack[2..12]).unwrap(), Progress::Pending);
        let reply = complete(reassembler.feed(&ack[12..]).unwrap());

        assert_eq!(reply.payload(), &[9, 9]);
    }

    #[test]
    fn test_unauthorized_ignores_accumulated_state() {
        let body = payload(100);
        let data = reply(ReplyCode::Data, &body);
        let mut reassembler = Reassembler::new();

        reassembler.feed(&prepare(100)).unwrap();
        reassembler.feed(&data[..60]).unwrap();

        let result = reassembler.feed(&reply(ReplyCode::AckUnauth, &[]));

        assert!(matches!(result, Err(Error::Unauthorized)));
        assert!(reassembler.is_idle());
    }

    #[test]
    fn test_rejection_codes() {
        let cases = [
            (ReplyCode::AckUnknown, "UNKNOWN_COMMAND"),
            (ReplyCode::AckError, "DEVICE_ERROR"),
            (ReplyCode::AckErrorData, "DEVICE_ERROR"),
            (ReplyCode::AckRepeat, "DEVICE_ERROR"),
        ];

        for (code, expected) in cases {
            let err = Reassembler::new()
                .feed(&reply(code, &[]))
                .unwrap_err();
            assert_eq!(err.code().as_str(), expected, "{code}");
        }
    }

    #[test]
    fn test_invalid_reply_code() {
        let bad = frame::encode(4242u16, 1, 1, &[]).unwrap();
        let result = Reassembler::new().feed(&bad);

        assert!(matches!(result, Err(Error::InvalidReplyCode(4242))));
    }

    #[test]
    fn test_unexpected_data() {
        let result = Reassembler::new().feed(&[0x01, 0x02, 0x03, 0x04, 0x05]);

        assert!(matches!(result, Err(Error::UnexpectedData { len: 5 })));
    }

    #[test]
    fn test_partial_magic_waits() {
        let mut reassembler = Reassembler::new();

        assert_eq!(reassembler.feed(&MAGIC[..2]).unwrap(), Progress::Pending);
        assert_eq!(reassembler.buffered(), 2);
    }

    #[test]
    fn test_headerless_window_after_prepare() {
        // Announced content followed by a header-sized lead-in without magic
        let body = payload(32);
        let mut window = vec![0u8; FRAME_HEADER_SIZE];
        window.extend(&body);

        let mut reassembler = Reassembler::new();
        reassembler.feed(&prepare(32)).unwrap();

        assert_eq!(reassembler.feed(&window[..20]).unwrap(), Progress::Pending);

        let reply = complete(reassembler.feed(&window[20..]).unwrap());
        assert_eq!(reply.payload(), body.as_slice());
    }

    #[test]
    fn test_headerless_window_tail_is_next_frame() {
        let body = payload(24);
        let mut chunk = vec![0u8; FRAME_HEADER_SIZE];
        chunk.extend(&body);
        chunk.extend(ack());

        let mut reassembler = Reassembler::new();
        reassembler.feed(&prepare(24)).unwrap();

        let reply = complete(reassembler.feed(&chunk).unwrap());
        assert_eq!(reply.payload(), body.as_slice());
    }

    #[test]
    fn test_remaining_bytes_window() {
        // First half arrives framed, second half headerless
        let body = payload(80);
        let mut reassembler = Reassembler::new();
        reassembler.feed(&prepare(80)).unwrap();
        reassembler
            .feed(&reply(ReplyCode::Data, &body[..30]))
            .unwrap();

        assert_eq!(reassembler.content_len(), 30);

        let mut rest = vec![0u8; FRAME_HEADER_SIZE];
        rest.extend(&body[30..]);
        let reply = complete(reassembler.feed(&rest).unwrap());
        assert_eq!(reply.payload(), body.as_slice());
    }

    #[test]
    fn test_embedded_header_cuts_frame() {
        // DATA frame declares 100 bytes, only 40 arrive before the ack
        let body = payload(100);
        let data = reply(ReplyCode::Data, &body);

        let mut chunk = data[..FRAME_HEADER_SIZE + 40].to_vec();
        chunk.extend(ack());

        let mut reassembler = Reassembler::new();
        reassembler.feed(&prepare(100)).unwrap();
        let reply = complete(reassembler.feed(&chunk).unwrap());

        assert_eq!(reply.payload(), &body[..40]);
    }

    #[test]
    fn test_magic_with_unknown_code_is_payload() {
        // Magic inside the body followed by a code the device never sends
        let mut body = payload(40);
        body[10..14].copy_from_slice(&MAGIC);
        body[18..20].copy_from_slice(&0x1234u16.to_le_bytes());
        let data = reply(ReplyCode::Data, &body);

        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&data[..30]).unwrap(), Progress::Pending);
        let reply = complete(reassembler.feed(&data[30..]).unwrap());

        assert_eq!(reply.payload(), body.as_slice());
    }

    #[test]
    fn test_checksum_verification() {
        let mut body = BytesMut::new();
        body.put_u16_le(ReplyCode::AckOk.into());
        body.put_u16_le(0);
        body.put_u16_le(0x2A);
        body.put_u16_le(3);
        body.put_slice(&[7, 7]);
        let checksum = crate::checksum::calculate(&body);
        body[2..4].copy_from_slice(&checksum.to_le_bytes());

        let mut valid = MAGIC.to_vec();
        valid.extend(&(body.len() as u16).to_le_bytes());
        valid.extend(&[0, 0]);
        valid.extend(&body);

        let mut strict = Reassembler::new().with_checksum_verification(true);
        assert!(matches!(strict.feed(&valid), Ok(Progress::Complete(_))));

        let mut corrupted = valid.clone();
        corrupted[17] ^= 0x01;
        let mut strict = Reassembler::new().with_checksum_verification(true);
        assert!(matches!(
            strict.feed(&corrupted),
            Err(Error::ChecksumMismatch { .. })
        ));

        // Lenient mode ignores the mismatch
        assert!(matches!(
            Reassembler::new().feed(&corrupted),
            Ok(Progress::Complete(_))
        ));
    }

    #[test]
    fn test_bytes_after_reply_discarded() {
        let mut stream = reply(ReplyCode::AckOk, &[1]);
        stream.extend(reply(ReplyCode::AckOk, &[2]));

        let mut reassembler = Reassembler::new();
        let reply = complete(reassembler.feed(&stream).unwrap());

        assert_eq!(reply.payload(), &[1]);
        assert!(reassembler.is_idle());
    }

    proptest! {
        #[test]
        fn reassembles_any_split(
            size in 1usize..600,
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
        ) {
            let body = payload(size);
            let mut stream = prepare(size);
            stream.extend(reply(ReplyCode::Data, &body));

            let mut points: Vec<usize> = cuts.iter().map(|i| i.index(stream.len())).collect();
            points.push(0);
            points.push(stream.len());
            points.sort_unstable();
            points.dedup();

            let mut reassembler = Reassembler::new();
            let mut result = None;

            for pair in points.windows(2) {
                let progress = reassembler.feed(&stream[pair[0]..pair[1]]).unwrap();
                prop_assert!(result.is_none(), "resolved before the last chunk");
                if let Progress::Complete(reply) = progress {
                    result = Some(reply);
                }
            }

            prop_assert_eq!(result, Some(Reply::Data(Bytes::from(body))));
        }
    }
}
