//! Request/reply engine
//!
//! Sends one framed request at a time and drives the reassembler across
//! however many socket reads the reply takes.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, Bytes};
use tokio::sync::Notify;
use tracing::{debug, info, trace};

use zkattend_core::{
    constants::{DEFAULT_TIMEOUT_MS, FRAME_HEADER_SIZE},
    frame, Command, FrameHeader, Progress, Reassembler, Reply, Session,
};
use zkattend_transport::Transport;

use crate::error::{Error, Result};

/// Frame length from which an ack to `CMD_DATA_WRRQ` carries a size handshake
const HANDSHAKE_LEN: usize = FRAME_HEADER_SIZE + 9;

/// Owns the link to one device: transport plus session counters
///
/// Every method takes `&mut self`, so one engine can never have two
/// requests in flight.
pub struct CommandEngine {
    transport: Box<dyn Transport>,
    session: Session,
    timeout: Duration,
    verify_checksums: bool,
    cancel: Arc<Notify>,
}

impl CommandEngine {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            session: Session::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            verify_checksums: false,
            cancel: Arc::new(Notify::new()),
        }
    }

    /// Set the per-call inactivity timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    /// Reject replies whose checksum does not match
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksums = enabled;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn set_checksum_verification(&mut self, enabled: bool) {
        self.verify_checksums = enabled;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    /// Handle that aborts the request in flight
    ///
    /// `notify_waiters()` on it makes the pending call fail with
    /// [`Error::Cancelled`].
    pub fn cancel_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.cancel)
    }

    /// Send one request and wait for its reassembled reply
    ///
    /// The timeout is rearmed on every chunk received, so slow multi-chunk
    /// transfers keep going while a silent device fails.
    ///
    /// # Errors
    ///
    /// - `ExecTimeout` if the device goes quiet for longer than the timeout
    /// - `Cancelled` if the cancel handle fires
    /// - rejection, reassembly and transport errors as they occur
    pub async fn execute(&mut self, command: Command, params: &[u8]) -> Result<Reply> {
        let cancel = Arc::clone(&self.cancel);
        let cancelled = cancel.notified();
        tokio::pin!(cancelled);

        let (session_id, request_id) = self.session.begin_request();
        let request = frame::encode(command, session_id, request_id, params)?;

        debug!(
            command = %command,
            session_id,
            request_id,
            len = params.len(),
            "Executing"
        );

        self.transport.send(&request).await?;

        let mut reassembler = Reassembler::new().with_checksum_verification(self.verify_checksums);

        loop {
            let received = tokio::select! {
                received = self.transport.receive(self.timeout) => received,
                _ = &mut cancelled => {
                    debug!(command = %command, "Request cancelled");
                    return Err(Error::Cancelled);
                }
            };

            let chunk = match received {
                Ok(chunk) => chunk,
                Err(zkattend_transport::Error::ReadTimeout) => {
                    return Err(Error::ExecTimeout {
                        command,
                        timeout: self.timeout,
                    });
                }
                Err(err) => return Err(err.into()),
            };

            if let Progress::Complete(reply) = reassembler.feed(&chunk)? {
                trace!(command = %command, len = reply.payload().len(), "Reply complete");
                return Ok(reply);
            }
        }
    }

    /// Fetch a bulk data set
    ///
    /// Small sets come back directly. Large ones are announced by an ack
    /// carrying the size twice; the data is then pulled with
    /// `CMD_DATA_RDY`.
    ///
    /// # Errors
    ///
    /// `SizeMismatch` if the two announced sizes differ, plus anything
    /// [`execute`](Self::execute) returns.
    pub async fn run(&mut self, command: Command, params: &[u8]) -> Result<Bytes> {
        let reply = self.execute(command, params).await?;

        let ack = match &reply {
            Reply::Ack(ack) if ack.len() >= HANDSHAKE_LEN => ack.clone(),
            _ => return Ok(reply.into_payload()),
        };

        let mut sizes = &ack[FRAME_HEADER_SIZE + 1..HANDSHAKE_LEN];
        let first = sizes.get_u32_le();
        let second = sizes.get_u32_le();

        if first != second {
            return Err(Error::SizeMismatch { first, second });
        }

        debug!(command = %command, size = first, "Large transfer");

        let mut params = [0u8; 8];
        params[4..].copy_from_slice(&first.to_le_bytes());

        let reply = self.execute(Command::DataRdy, &params).await?;
        Ok(reply.into_payload())
    }

    /// Establish a protocol session
    ///
    /// Returns the session ID assigned by the device.
    ///
    /// # Errors
    ///
    /// `NoSession` if the device answers with a zero session ID.
    pub async fn open(&mut self) -> Result<u16> {
        let reply = self.execute(Command::Connect, &[]).await?;

        let raw = reply.frame().ok_or_else(|| {
            Error::InvalidResponse("connect answered with a data transfer".into())
        })?;
        let header = FrameHeader::decode(raw)?;

        self.session.open(header.session_id)?;

        info!(session_id = header.session_id, "Session opened");
        Ok(header.session_id)
    }

    /// End the protocol session
    ///
    /// Counters are reset even if the device does not acknowledge.
    pub async fn close(&mut self) -> Result<()> {
        let result = self.execute(Command::Exit, &[]).await;
        self.session.close();

        result.map(|_| {
            info!("Session closed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{frames, reply, scripted, Sent};
    use pretty_assertions::assert_eq;
    use zkattend_core::{ErrorCode, ReplyCode};

    fn engine(chunks: Vec<Vec<u8>>) -> (CommandEngine, Sent) {
        let (mock, sent) = scripted(chunks);
        let engine = CommandEngine::new(Box::new(mock)).with_timeout(Duration::from_millis(200));
        (engine, sent)
    }

    #[tokio::test]
    async fn test_execute_inline_reply() {
        let (mut engine, sent) = engine(vec![reply(ReplyCode::AckOk, 0, 0, b"Ver 6.60\0")]);

        let reply = engine.execute(Command::GetVersion, &[]).await.unwrap();

        assert_eq!(reply.payload(), b"Ver 6.60\0");
        let header = FrameHeader::decode(&sent.lock()[0]).unwrap();
        assert_eq!(header.reply_code, u16::from(Command::GetVersion));
    }

    #[tokio::test]
    async fn test_counters_advance_after_open() {
        let (mut engine, sent) = engine(vec![
            reply(ReplyCode::AckOk, 0x1234, 0, &[]),
            reply(ReplyCode::AckOk, 0x1234, 1, &[]),
            reply(ReplyCode::AckOk, 0x1234, 2, &[]),
        ]);

        assert_eq!(engine.open().await.unwrap(), 0x1234);
        engine.execute(Command::GetTime, &[]).await.unwrap();
        engine.execute(Command::GetTime, &[]).await.unwrap();

        let headers: Vec<_> = frames(&sent)
            .iter()
            .map(|buf| FrameHeader::decode(buf).unwrap())
            .collect();

        // Connect goes out with both counters pinned at zero
        assert_eq!((headers[0].session_id, headers[0].reply_id), (0, 1));
        assert_eq!((headers[1].session_id, headers[1].reply_id), (0x1234, 2));
        assert_eq!((headers[2].session_id, headers[2].reply_id), (0x1234, 3));
    }

    #[tokio::test]
    async fn test_open_without_session_id() {
        let (mut engine, _) = engine(vec![reply(ReplyCode::AckOk, 0, 0, &[])]);

        let err = engine.open().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NoSession);
        assert!(!engine.session().is_open());
    }

    #[tokio::test]
    async fn test_execute_multi_chunk() {
        let body: Vec<u8> = (0..500).map(|i| (i % 50) as u8).collect();
        let mut stream = reply(ReplyCode::PrepareData, 1, 1, &500u32.to_le_bytes());
        stream.extend(reply(ReplyCode::Data, 1, 1, &body));
        stream.extend(reply(ReplyCode::AckOk, 1, 1, &[]));
        let chunks = stream.chunks(37).map(<[u8]>::to_vec).collect();

        let (mut engine, _) = engine(chunks);
        let reply = engine.execute(Command::DataRdy, &[0; 8]).await.unwrap();

        assert_eq!(reply, Reply::Data(Bytes::from(body)));
    }

    #[tokio::test]
    async fn test_execute_timeout() {
        let (mut engine, _) = engine(vec![]);

        let err = engine.execute(Command::GetTime, &[]).await.unwrap_err();

        assert!(matches!(
            err,
            Error::ExecTimeout { command: Command::GetTime, .. }
        ));
    }

    #[tokio::test]
    async fn test_execute_rejected() {
        let (mut engine, _) = engine(vec![reply(ReplyCode::AckUnauth, 0, 0, &[])]);

        let err = engine.execute(Command::GetFreeSizes, &[]).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_run_small_reply() {
        let mut content = 40u32.to_le_bytes().to_vec();
        content.extend([0u8; 40]);
        let (mut engine, sent) = engine(vec![reply(ReplyCode::Data, 1, 1, &content)]);

        let data = engine.run(Command::DataWrrq, &[1, 13, 0]).await.unwrap();

        assert_eq!(data.as_ref(), content.as_slice());
        assert_eq!(sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_run_large_transfer() {
        let body: Vec<u8> = (0..200).map(|i| (i % 50) as u8).collect();

        let mut handshake = vec![0u8];
        handshake.extend(200u32.to_le_bytes());
        handshake.extend(200u32.to_le_bytes());

        let mut transfer = reply(ReplyCode::PrepareData, 1, 2, &200u32.to_le_bytes());
        transfer.extend(reply(ReplyCode::Data, 1, 2, &body));
        transfer.extend(reply(ReplyCode::AckOk, 1, 2, &[]));

        let (mut engine, sent) = engine(vec![reply(ReplyCode::AckOk, 1, 1, &handshake), transfer]);

        let data = engine.run(Command::DataWrrq, &[1, 9, 0]).await.unwrap();
        assert_eq!(data.as_ref(), body.as_slice());

        let sent = frames(&sent);
        assert_eq!(sent.len(), 2);
        let header = FrameHeader::decode(&sent[1]).unwrap();
        assert_eq!(header.reply_code, u16::from(Command::DataRdy));
        assert_eq!(frame::content(&sent[1]), &[0, 0, 0, 0, 200, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_run_size_mismatch() {
        let mut handshake = vec![0u8];
        handshake.extend(200u32.to_le_bytes());
        handshake.extend(201u32.to_le_bytes());

        let (mut engine, _) = engine(vec![reply(ReplyCode::AckOk, 1, 1, &handshake)]);

        let err = engine.run(Command::DataWrrq, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch { first: 200, second: 201 }
        ));
    }

    #[tokio::test]
    async fn test_run_short_ack() {
        let (mut engine, _) = engine(vec![reply(ReplyCode::AckOk, 1, 1, &[7, 7])]);

        let data = engine.run(Command::DataWrrq, &[]).await.unwrap();
        assert_eq!(data.as_ref(), &[7, 7]);
    }

    #[tokio::test]
    async fn test_close_resets_session() {
        let (mut engine, _) = engine(vec![]);
        engine.session_mut().open(9).unwrap();

        // No reply to CMD_EXIT
        let result = engine.close().await;

        assert!(result.is_err());
        assert!(!engine.session().is_open());
    }
}
