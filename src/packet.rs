use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};

use crate::error::{Error, ErrorCode};

/// Command byte + two length bytes precede the arguments of every request.
pub const HEADER_SIZE: usize = 3;

/// Command opcodes understood by the hub.
///
/// Paired set/read operations share one opcode; the argument length tells the
/// peripheral which one is meant (set carries arguments, read carries none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Command {
    /// Configure or read port 1 (analog/digital sensors).
    Port1 = 0x00,
    /// Configure or read port 2 (I2C/UART sensors).
    Port2 = 0x01,
    /// Configure or read port 3 (I2C/UART sensors).
    Port3 = 0x02,
    /// Set or read the hub's own bus address.
    Address = 0x03,
    /// Set or read the on-board real-time clock.
    RtcTime = 0x04,
    RecordOn = 0x05,
    RecordOff = 0x06,
    ScreenOn = 0x07,
    ScreenOff = 0x08,
    /// Data names of the sensors on the selected ports.
    GetName = 0x09,
    /// Data values of the sensors on the selected ports.
    GetValue = 0x0A,
    /// Data units of the sensors on the selected ports.
    GetUnit = 0x0B,
    /// SKUs of the sensors on the selected ports.
    GetSku = 0x0C,
    /// Full `name:value unit` records for the selected ports.
    GetInfo = 0x0D,
    KeyValueAll = 0x0E,
    KeyValuePort = 0x0F,
    KeyValueSku = 0x10,
    KeyUnitAll = 0x11,
    KeyUnitPort = 0x12,
    KeyUnitSku = 0x13,
    /// Flush the peripheral's transmit buffer and realign framing.
    Reset = 0x14,
    SkuListAnalog = 0x15,
    SkuListDigital = 0x16,
    SkuListI2c = 0x17,
    SkuListUart = 0x18,
    /// Refresh timestamp of the current readings.
    Timestamp = 0x19,
    /// Set or read the data refresh rate.
    RefreshRate = 0x20,
    /// Firmware version, two big-endian bytes.
    Version = 0x21,
}

/// Status byte opening every framed response. Any other value in the
/// status-byte position is bus noise, not a frame start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Status {
    Success = 0x53,
    Failed = 0x63,
    #[num_enum(catch_all)]
    Noise(u8),
}

impl Status {
    pub fn is_frame_start(&self) -> bool {
        matches!(self, Status::Success | Status::Failed)
    }
}

/// An outgoing request: opcode plus already-encoded argument bytes.
///
/// Immutable once built; the engine serializes and transmits it in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPacket {
    command: Command,
    args: Bytes,
}

impl CommandPacket {
    pub fn new(command: Command, args: &[u8]) -> Self {
        Self {
            command,
            args: Bytes::copy_from_slice(args),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Serialize to wire form: `command, len_lo, len_hi, args...`.
    /// The length field counts argument bytes only and is little-endian.
    pub fn encode(&self) -> Bytes {
        let len = self.args.len() as u16;
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.args.len());
        buf.put_u8(self.command.into());
        buf.put_u8((len & 0xFF) as u8);
        buf.put_u8((len >> 8) as u8);
        buf.put_slice(&self.args);
        buf.freeze()
    }
}

/// One framed response, assembled by the receive loop. Lives only for the
/// duration of a single exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    /// The command byte echoed by the peripheral; the engine has already
    /// verified it matches the request.
    pub command: u8,
    pub payload: Bytes,
}

impl Response {
    /// Extract the payload of a successful response, or the peripheral's
    /// error code from a failed one.
    pub fn into_payload(self) -> Result<Bytes, Error> {
        match self.status {
            Status::Success => Ok(self.payload),
            _ => {
                let code = self
                    .payload
                    .first()
                    .copied()
                    .map(ErrorCode::from_primitive)
                    .unwrap_or(ErrorCode::ResponsePacket);
                Err(Error::Device(code))
            }
        }
    }

    /// Decode the payload byte-per-character, the way the peripheral emits
    /// its comma-joined ASCII strings.
    pub fn text(&self) -> String {
        ascii_text(&self.payload)
    }
}

pub(crate) fn ascii_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
