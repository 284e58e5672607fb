use std::time::Duration;

use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;
use thiserror::Error;

/// Wire-level error codes of the hub protocol.
///
/// `ResponsePacket` and `ResponseTimeout` are raised by the receive loop on
/// the host side; every other code is reported by the peripheral in the first
/// payload byte of a FAILED response and passed through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorCode {
    #[strum(to_string = "no error")]
    None = 0x00,
    #[strum(to_string = "command not recognized")]
    InvalidCommand = 0x01,
    #[strum(to_string = "response packet error")]
    ResponsePacket = 0x02,
    #[strum(to_string = "controller out of memory")]
    ControllerNoSpace = 0x03,
    #[strum(to_string = "response timeout")]
    ResponseTimeout = 0x04,
    #[strum(to_string = "malformed command packet")]
    CommandPacket = 0x05,
    #[strum(to_string = "peripheral fault")]
    PeripheralFault = 0x06,
    #[strum(to_string = "invalid arguments")]
    InvalidArgs = 0x07,
    #[strum(to_string = "unknown or unsupported SKU")]
    UnknownSku = 0x08,
    #[strum(to_string = "peripheral out of memory")]
    PeripheralNoSpace = 0x09,
    #[strum(to_string = "bus address out of range")]
    InvalidAddress = 0x0A,
    #[strum(to_string = "unrecognized error code")]
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// The primary error type for the `sensorhub` library.
#[derive(Error, Debug)]
pub enum Error {
    /// The peripheral answered with a FAILED status; the code is its own.
    #[error("device reported: {0}")]
    Device(ErrorCode),

    /// A framed response arrived but echoed the wrong command. The engine
    /// has already sent a resync reset by the time this is returned.
    #[error("response command mismatch: expected {expected:#04x}, got {actual:#04x}")]
    CommandMismatch { expected: u8, actual: u8 },

    /// No validly framed response arrived before the deadline. The engine
    /// has already sent a hard reset by the time this is returned.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("insufficient response data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// The wire-taxonomy equivalent of this error, for callers that branch
    /// on the numeric protocol codes.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Device(code) => *code,
            Error::CommandMismatch { .. } => ErrorCode::ResponsePacket,
            Error::Timeout(_) => ErrorCode::ResponseTimeout,
            Error::InsufficientData { .. } | Error::InvalidResponse(_) => ErrorCode::ResponsePacket,
        }
    }
}
