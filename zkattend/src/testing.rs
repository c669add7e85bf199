//! Scripted transport for unit tests

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use mockall::mock;
use parking_lot::Mutex;

use zkattend_core::{frame, ReplyCode};
use zkattend_transport::{Error, Result, Transport};

mock! {
    pub Link {}

    #[async_trait]
    impl Transport for Link {
        async fn connect(&mut self) -> Result<()>;
        async fn disconnect(&mut self) -> Result<()>;
        fn is_connected(&self) -> bool;
        async fn send(&mut self, data: &[u8]) -> Result<()>;
        async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;
        fn remote_addr(&self) -> String;
    }
}

/// Frames written to a scripted link
pub type Sent = Arc<Mutex<Vec<Vec<u8>>>>;

/// Reply frame as a device would send it
pub fn reply(code: ReplyCode, session_id: u16, reply_id: u16, payload: &[u8]) -> Vec<u8> {
    frame::encode(code, session_id, reply_id, payload)
        .unwrap()
        .to_vec()
}

pub fn frames(sent: &Sent) -> Vec<Vec<u8>> {
    sent.lock().clone()
}

/// Connected link that plays back `chunks` one per read
///
/// Reads past the end of the script time out.
pub fn scripted(chunks: Vec<Vec<u8>>) -> (MockLink, Sent) {
    let sent = Sent::default();
    let mut queue: VecDeque<Vec<u8>> = chunks.into();

    let mut mock = MockLink::new();

    let log = Arc::clone(&sent);
    mock.expect_send().returning(move |data| {
        log.lock().push(data.to_vec());
        Ok(())
    });
    mock.expect_receive().returning(move |_| {
        queue
            .pop_front()
            .map(|chunk| BytesMut::from(chunk.as_slice()))
            .ok_or(Error::ReadTimeout)
    });
    mock.expect_connect().returning(|| Ok(()));
    mock.expect_disconnect().returning(|| Ok(()));
    mock.expect_is_connected().return_const(true);
    mock.expect_remote_addr().return_const("mock:4370".to_string());

    (mock, sent)
}
