//! High-level device interface

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard, Notify};
use tracing::{debug, info, warn};

use zkattend_core::{constants::requests, Command, ConnectionState, Reply};
use zkattend_transport::{TcpTransport, Transport};
use zkattend_types::{
    ascii_field, decode_list, AttendanceRecord, Capacities, PackedTime, User,
};

use crate::{
    engine::CommandEngine,
    error::{Error, Result},
};

/// Time-attendance terminal
///
/// High-level interface over one TCP connection. Methods take `&self` and
/// can be called from several tasks; requests are queued and go out one at
/// a time.
///
/// # Examples
///
/// ```no_run
/// use zkattend::Device;
///
/// #[tokio::main]
/// async fn main() -> zkattend::Result<()> {
///     let device = Device::new("192.168.1.201", 4370);
///
///     device.connect().await?;
///     device.open().await?;
///
///     println!("Firmware: {}", device.firmware_version().await?);
///     for record in device.get_records().await? {
///         println!("{} {}", record.user_id, record.timestamp);
///     }
///
///     device.close().await?;
///     device.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Device {
    engine: Mutex<CommandEngine>,
    state: RwLock<ConnectionState>,
    cancel: Arc<Notify>,
    addr: String,
}

impl Device {
    /// Create a new device instance (TCP transport)
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self::with_transport(Box::new(TcpTransport::new(ip, port)))
    }

    /// Create a device over any transport
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        let addr = transport.remote_addr();
        let engine = CommandEngine::new(transport);
        let cancel = engine.cancel_handle();

        Self {
            engine: Mutex::new(engine),
            state: RwLock::new(ConnectionState::Disconnected),
            cancel,
            addr,
        }
    }

    /// Set the per-call inactivity timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.engine.get_mut().set_timeout(timeout);
        self
    }

    /// Verify the checksum of every reply frame
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.engine.get_mut().set_checksum_verification(enabled);
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Check if the socket is up (whether or not a session is open)
    ///
    /// While a request is in flight the transport is busy and only the
    /// lifecycle state is consulted.
    pub fn is_connected(&self) -> bool {
        self.state().has_socket()
            && self
                .engine
                .try_lock()
                .map_or(true, |engine| engine.transport().is_connected())
    }

    /// Open the TCP connection
    ///
    /// # Errors
    ///
    /// Transport errors carry the socket code (`ECONNREFUSED`, `ETIMEDOUT`,
    /// `ENOTFOUND`, ...).
    pub async fn connect(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            if *state != ConnectionState::Disconnected {
                return Err(zkattend_transport::Error::AlreadyConnected.into());
            }
            *state = ConnectionState::Connecting;
        }

        info!("Connecting to {}...", self.addr);

        let mut engine = self.engine.lock().await;

        match engine.transport_mut().connect().await {
            Ok(()) => {
                self.set_state(ConnectionState::Connected);
                info!("Connected to {}", self.addr);
                Ok(())
            }
            Err(err) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(code = %err.code(), "Connection to {} failed: {}", self.addr, err);
                Err(err.into())
            }
        }
    }

    /// Close the TCP connection
    ///
    /// A request still waiting for its reply fails with `Cancelled`.
    /// Disconnecting an idle device is a no-op.
    pub async fn disconnect(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            if !state.has_socket() {
                return Ok(());
            }
            *state = ConnectionState::Closing;
        }

        info!("Disconnecting from {}...", self.addr);

        self.cancel.notify_waiters();

        let mut engine = self.engine.lock().await;
        let result = engine.transport_mut().disconnect().await;
        engine.session_mut().close();
        self.set_state(ConnectionState::Disconnected);

        info!("Disconnected");
        result.map_err(Into::into)
    }

    /// Establish the protocol session
    ///
    /// # Errors
    ///
    /// `NO_SESSION` if the device does not assign a session ID,
    /// `UNAUTHORIZED` if it requires a comm key.
    pub async fn open(&self) -> Result<()> {
        let mut engine = self.engine().await?;
        let result = engine.open().await;
        let session_id = self.settle(&mut engine, result).await?;

        self.set_state(ConnectionState::Open);
        debug!(session_id, "Device open");
        Ok(())
    }

    /// End the protocol session, keeping the socket
    pub async fn close(&self) -> Result<()> {
        let mut engine = self.engine().await?;
        let result = engine.close().await;

        if self.state() == ConnectionState::Open {
            self.set_state(ConnectionState::Connected);
        }
        self.settle(&mut engine, result).await
    }

    /// Release the device-side transfer buffer
    pub async fn clear_buffer(&self) -> Result<()> {
        self.execute(Command::FreeData, &[]).await.map(|_| ())
    }

    /// Storage counters for users, fingerprints and records
    pub async fn capacities(&self) -> Result<Capacities> {
        let reply = self.execute(Command::GetFreeSizes, &[]).await?;
        Ok(Capacities::decode(reply.payload())?)
    }

    /// Firmware version string
    pub async fn firmware_version(&self) -> Result<String> {
        let reply = self.execute(Command::GetVersion, &[]).await?;
        Ok(ascii_field(reply.payload()))
    }

    /// Device clock
    pub async fn get_time(&self) -> Result<PackedTime> {
        let reply = self.execute(Command::GetTime, &[]).await?;

        let payload = reply.payload();
        let raw: [u8; 4] = payload
            .get(..4)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(zkattend_types::Error::TooShort {
                expected: 4,
                actual: payload.len(),
            })?;

        Ok(PackedTime::new(u32::from_le_bytes(raw)))
    }

    /// All enrolled users
    pub async fn get_users(&self) -> Result<Vec<User>> {
        let content = self.run(Command::DataWrrq, &requests::USERS).await?;
        let users: Vec<User> = decode_list(&content)?;

        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// All stored attendance records
    pub async fn get_records(&self) -> Result<Vec<AttendanceRecord>> {
        let content = self
            .run(Command::DataWrrq, &requests::ATTENDANCE_RECORDS)
            .await?;
        let records: Vec<AttendanceRecord> = decode_list(&content)?;

        debug!(count = records.len(), "Fetched attendance records");
        Ok(records)
    }

    /// Enable device (normal operation mode)
    pub async fn enable_device(&self) -> Result<()> {
        self.execute(Command::EnableDevice, &[]).await.map(|_| ())
    }

    /// Disable device (show "Working..." on LCD)
    pub async fn disable_device(&self) -> Result<()> {
        self.execute(Command::DisableDevice, &[]).await.map(|_| ())
    }

    /// Restart device
    ///
    /// The device drops the connection afterwards.
    pub async fn restart(&self) -> Result<()> {
        warn!("Restarting device...");
        self.execute(Command::Restart, &[]).await.map(|_| ())
    }

    /// Put the device to sleep
    pub async fn sleep(&self) -> Result<()> {
        self.execute(Command::Sleep, &[]).await.map(|_| ())
    }

    /// Wake the device from sleep
    pub async fn resume(&self) -> Result<()> {
        self.execute(Command::Resume, &[]).await.map(|_| ())
    }

    /// Power off device
    pub async fn shutdown(&self) -> Result<()> {
        warn!("Powering off device...");
        self.execute(Command::PowerOff, &[]).await.map(|_| ())
    }

    /// Play a built-in sound (0 plays "Thank you")
    pub async fn test_voice(&self, index: u32) -> Result<()> {
        self.execute(Command::TestVoice, &index.to_le_bytes())
            .await
            .map(|_| ())
    }

    /// Send a raw command and return the reassembled reply
    pub async fn execute(&self, command: Command, params: &[u8]) -> Result<Reply> {
        let mut engine = self.engine().await?;
        let result = engine.execute(command, params).await;
        self.settle(&mut engine, result).await
    }

    /// Fetch a bulk data set with a raw command
    pub async fn run(&self, command: Command, params: &[u8]) -> Result<Bytes> {
        let mut engine = self.engine().await?;
        let result = engine.run(command, params).await;
        self.settle(&mut engine, result).await
    }

    // Helper methods

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Wait for the engine and check the connection is usable
    async fn engine(&self) -> Result<MutexGuard<'_, CommandEngine>> {
        let engine = self.engine.lock().await;

        if !self.state().has_socket() || !engine.transport().is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(engine)
    }

    /// Tear the connection down after a fatal error
    async fn settle<T>(&self, engine: &mut CommandEngine, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                warn!(code = %err.code(), "Connection lost: {}", err);

                if let Err(err) = engine.transport_mut().disconnect().await {
                    debug!(error = %err, "Transport cleanup failed");
                }
                engine.session_mut().close();
                self.set_state(ConnectionState::Disconnected);
            } else {
                debug!(code = %err.code(), "Request failed: {}", err);
            }
        }
        result
    }
}
