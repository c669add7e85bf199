//! Command and reply code definitions

use std::fmt;

use crate::error::{Error, Result};

/// Request command codes (from PC to device)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    // Connection commands
    Connect = 1000,
    Exit = 1001,
    EnableDevice = 1002,
    DisableDevice = 1003,
    Restart = 1004,
    PowerOff = 1005,
    Sleep = 1006,
    Resume = 1007,

    // Device interaction
    CaptureFinger = 1009,
    TestTemp = 1011,
    CaptureImage = 1012,
    RefreshData = 1013,
    RefreshOption = 1014,
    TestVoice = 1017,

    // Device information
    GetVersion = 1100,
    ChangeSpeed = 1101,
    Auth = 1102,

    // Data transfer
    PrepareData = 1500,
    Data = 1501,
    FreeData = 1502,
    DataWrrq = 1503,
    DataRdy = 1504,

    // Database operations
    DbRrq = 7,
    UserWrq = 8,
    UserTempRrq = 9,
    UserTempWrq = 10,
    OptionsRrq = 11,
    OptionsWrq = 12,
    AttLogRrq = 13,
    ClearData = 14,
    ClearAttLog = 15,
    DeleteUser = 18,
    DeleteUserTemp = 19,
    ClearAdmin = 20,

    // Group & timezone management
    UserGrpRrq = 21,
    UserGrpWrq = 22,
    UserTzRrq = 23,
    UserTzWrq = 24,
    GrpTzRrq = 25,
    GrpTzWrq = 26,
    TzRrq = 27,
    TzWrq = 28,
    UlgRrq = 29,
    UlgWrq = 30,
    Unlock = 31,
    ClearAcc = 32,
    ClearOpLog = 33,
    OpLogRrq = 34,

    // Device status
    GetFreeSizes = 50,
    EnableClock = 57,
    StartVerify = 60,
    StartEnroll = 61,
    CancelCapture = 62,
    StateRrq = 64,
    WriteLcd = 66,
    ClearLcd = 67,
    GetPinWidth = 69,

    // SMS operations
    SmsWrq = 70,
    SmsRrq = 71,
    DeleteSms = 72,
    UDataWrq = 73,
    DeleteUData = 74,

    // Access control
    DoorStateRrq = 75,
    WriteMifare = 76,
    EmptyMifare = 78,
    VerifyWrq = 79,
    VerifyRrq = 80,
    TmpWrite = 87,
    ChecksumBuffer = 119,
    DelFpTmp = 134,

    // Time operations
    GetTime = 201,
    SetTime = 202,

    // Real-time events
    RegEvent = 500,
}

impl Command {
    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Connect => "CMD_CONNECT",
            Self::Exit => "CMD_EXIT",
            Self::EnableDevice => "CMD_ENABLEDEVICE",
            Self::DisableDevice => "CMD_DISABLEDEVICE",
            Self::Restart => "CMD_RESTART",
            Self::PowerOff => "CMD_POWEROFF",
            Self::Sleep => "CMD_SLEEP",
            Self::Resume => "CMD_RESUME",
            Self::CaptureFinger => "CMD_CAPTUREFINGER",
            Self::TestTemp => "CMD_TEST_TEMP",
            Self::CaptureImage => "CMD_CAPTUREIMAGE",
            Self::RefreshData => "CMD_REFRESHDATA",
            Self::RefreshOption => "CMD_REFRESHOPTION",
            Self::TestVoice => "CMD_TESTVOICE",
            Self::GetVersion => "CMD_GET_VERSION",
            Self::ChangeSpeed => "CMD_CHANGE_SPEED",
            Self::Auth => "CMD_AUTH",
            Self::PrepareData => "CMD_PREPARE_DATA",
            Self::Data => "CMD_DATA",
            Self::FreeData => "CMD_FREE_DATA",
            Self::DataWrrq => "CMD_DATA_WRRQ",
            Self::DataRdy => "CMD_DATA_RDY",
            Self::DbRrq => "CMD_DB_RRQ",
            Self::UserWrq => "CMD_USER_WRQ",
            Self::UserTempRrq => "CMD_USERTEMP_RRQ",
            Self::UserTempWrq => "CMD_USERTEMP_WRQ",
            Self::OptionsRrq => "CMD_OPTIONS_RRQ",
            Self::OptionsWrq => "CMD_OPTIONS_WRQ",
            Self::AttLogRrq => "CMD_ATTLOG_RRQ",
            Self::ClearData => "CMD_CLEAR_DATA",
            Self::ClearAttLog => "CMD_CLEAR_ATTLOG",
            Self::DeleteUser => "CMD_DELETE_USER",
            Self::DeleteUserTemp => "CMD_DELETE_USERTEMP",
            Self::ClearAdmin => "CMD_CLEAR_ADMIN",
            Self::UserGrpRrq => "CMD_USERGRP_RRQ",
            Self::UserGrpWrq => "CMD_USERGRP_WRQ",
            Self::UserTzRrq => "CMD_USERTZ_RRQ",
            Self::UserTzWrq => "CMD_USERTZ_WRQ",
            Self::GrpTzRrq => "CMD_GRPTZ_RRQ",
            Self::GrpTzWrq => "CMD_GRPTZ_WRQ",
            Self::TzRrq => "CMD_TZ_RRQ",
            Self::TzWrq => "CMD_TZ_WRQ",
            Self::UlgRrq => "CMD_ULG_RRQ",
            Self::UlgWrq => "CMD_ULG_WRQ",
            Self::Unlock => "CMD_UNLOCK",
            Self::ClearAcc => "CMD_CLEAR_ACC",
            Self::ClearOpLog => "CMD_CLEAR_OPLOG",
            Self::OpLogRrq => "CMD_OPLOG_RRQ",
            Self::GetFreeSizes => "CMD_GET_FREE_SIZES",
            Self::EnableClock => "CMD_ENABLE_CLOCK",
            Self::StartVerify => "CMD_STARTVERIFY",
            Self::StartEnroll => "CMD_STARTENROLL",
            Self::CancelCapture => "CMD_CANCELCAPTURE",
            Self::StateRrq => "CMD_STATE_RRQ",
            Self::WriteLcd => "CMD_WRITE_LCD",
            Self::ClearLcd => "CMD_CLEAR_LCD",
            Self::GetPinWidth => "CMD_GET_PINWIDTH",
            Self::SmsWrq => "CMD_SMS_WRQ",
            Self::SmsRrq => "CMD_SMS_RRQ",
            Self::DeleteSms => "CMD_DELETE_SMS",
            Self::UDataWrq => "CMD_UDATA_WRQ",
            Self::DeleteUData => "CMD_DELETE_UDATA",
            Self::DoorStateRrq => "CMD_DOORSTATE_RRQ",
            Self::WriteMifare => "CMD_WRITE_MIFARE",
            Self::EmptyMifare => "CMD_EMPTY_MIFARE",
            Self::VerifyWrq => "CMD_VERIFY_WRQ",
            Self::VerifyRrq => "CMD_VERIFY_RRQ",
            Self::TmpWrite => "CMD_TMP_WRITE",
            Self::ChecksumBuffer => "CMD_CHECKSUM_BUFFER",
            Self::DelFpTmp => "CMD_DEL_FPTMP",
            Self::GetTime => "CMD_GET_TIME",
            Self::SetTime => "CMD_SET_TIME",
            Self::RegEvent => "CMD_REG_EVENT",
        }
    }
}

impl From<Command> for u16 {
    fn from(cmd: Command) -> u16 {
        cmd as u16
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u16)
    }
}

/// Reply codes (from device to PC)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ReplyCode {
    /// Requested data was prepared, bulk chunks follow
    PrepareData = 1500,
    /// Bulk data chunk
    Data = 1501,
    AckOk = 2000,
    AckError = 2001,
    AckData = 2002,
    AckRetry = 2003,
    AckRepeat = 2004,
    AckUnauth = 2005,
    AckUnknown = 0xFFFF,
    AckErrorCmd = 0xFFFD,
    AckErrorInit = 0xFFFC,
    AckErrorData = 0xFFFB,
}

impl ReplyCode {
    /// Check if this is a success reply
    pub fn is_success(self) -> bool {
        matches!(self, Self::AckOk | Self::AckData)
    }

    /// Get reply name
    pub fn name(self) -> &'static str {
        match self {
            Self::PrepareData => "CMD_PREPARE_DATA",
            Self::Data => "CMD_DATA",
            Self::AckOk => "CMD_ACK_OK",
            Self::AckError => "CMD_ACK_ERROR",
            Self::AckData => "CMD_ACK_DATA",
            Self::AckRetry => "CMD_ACK_RETRY",
            Self::AckRepeat => "CMD_ACK_REPEAT",
            Self::AckUnauth => "CMD_ACK_UNAUTH",
            Self::AckUnknown => "CMD_ACK_UNKNOWN",
            Self::AckErrorCmd => "CMD_ACK_ERROR_CMD",
            Self::AckErrorInit => "CMD_ACK_ERROR_INIT",
            Self::AckErrorData => "CMD_ACK_ERROR_DATA",
        }
    }

    /// Error raised when the device answers with this code
    ///
    /// Returns `None` for codes that do not reject the request.
    pub fn rejection(self) -> Option<Error> {
        match self {
            Self::AckUnauth => Some(Error::Unauthorized),
            Self::AckUnknown => Some(Error::UnknownCommand),
            Self::AckError
            | Self::AckErrorCmd
            | Self::AckErrorInit
            | Self::AckErrorData
            | Self::AckRetry
            | Self::AckRepeat => Some(Error::DeviceError { reply: self }),
            Self::AckOk | Self::AckData | Self::PrepareData | Self::Data => None,
        }
    }
}

impl From<ReplyCode> for u16 {
    fn from(code: ReplyCode) -> u16 {
        code as u16
    }
}

impl TryFrom<u16> for ReplyCode {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1500 => Ok(Self::PrepareData),
            1501 => Ok(Self::Data),
            2000 => Ok(Self::AckOk),
            2001 => Ok(Self::AckError),
            2002 => Ok(Self::AckData),
            2003 => Ok(Self::AckRetry),
            2004 => Ok(Self::AckRepeat),
            2005 => Ok(Self::AckUnauth),
            0xFFFF => Ok(Self::AckUnknown),
            0xFFFD => Ok(Self::AckErrorCmd),
            0xFFFC => Ok(Self::AckErrorInit),
            0xFFFB => Ok(Self::AckErrorData),
            _ => Err(Error::InvalidReplyCode(value)),
        }
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u16)
    }
}
