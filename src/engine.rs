use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use num_enum::FromPrimitive;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::packet::{Command, CommandPacket, Response, Status};
use crate::transport::Transport;

/// Default receive deadline. Reading many sensors at once can legitimately
/// take the peripheral a while, so callers may need to raise it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Sleep between polls for a frame-start byte.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Grace period after a reset packet, giving the peripheral time to flush
/// its transmit buffer. Fixed, not adaptive.
pub const DEFAULT_RESET_SETTLE: Duration = Duration::from_secs(2);

/// Per-instance engine configuration. Two engines talking to peripherals at
/// different addresses share nothing.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 7-bit bus address of the peripheral.
    pub address: u8,
    /// Receive deadline, compared against wall-clock elapsed time.
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub reset_settle: Duration,
}

impl EngineConfig {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            reset_settle: DEFAULT_RESET_SETTLE,
        }
    }
}

/// The framed request/response engine.
///
/// [`exchange`](Self::exchange) is a blocking call: it transmits one command
/// packet and polls the transport until a validly framed response arrives,
/// the deadline passes, or an out-of-sync frame forces a resync. At most one
/// exchange is in flight at a time; `&mut self` enforces that for a single
/// owner, and a multi-threaded host must wrap the engine (or the hub owning
/// it) in a mutex spanning whole exchanges.
///
/// Transport failures are deliberately not surfaced as errors: a failed
/// write is swallowed and a failed read yields zeroed bytes, matching the
/// peripheral's observed bus behavior. Both are logged at `warn`. The
/// consequence is that a dead bus manifests as [`Error::Timeout`], not as an
/// I/O error.
pub struct ProtocolEngine<T> {
    transport: T,
    config: EngineConfig,
}

impl<T: Transport> ProtocolEngine<T> {
    pub fn new(transport: T, config: EngineConfig) -> Self {
        Self { transport, config }
    }

    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// Retarget subsequent traffic, e.g. after the peripheral acknowledged
    /// an address change.
    pub fn set_address(&mut self, address: u8) {
        self.config.address = address;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    /// Send one command and block until its response arrives or the
    /// exchange fails. The only errors raised here are
    /// [`Error::CommandMismatch`] and [`Error::Timeout`]; a FAILED status
    /// is returned as a normal [`Response`] for the caller to decode.
    pub fn exchange(&mut self, command: Command, args: &[u8]) -> Result<Response, Error> {
        self.send(&CommandPacket::new(command, args));
        self.receive(command)
    }

    /// Serialize and transmit in one step; a command packet never exists
    /// unsent.
    fn send(&mut self, packet: &CommandPacket) {
        let bytes = packet.encode();
        trace!(command = ?packet.command(), len = bytes.len(), "sending command packet");
        if let Err(err) = self.transport.write(self.config.address, &bytes) {
            warn!(%err, "transport write failed, continuing");
        }
    }

    /// Read exactly `buf.len()` bytes, zero-filling on transport failure.
    fn read_into(&mut self, buf: &mut [u8]) {
        if let Err(err) = self.transport.read(self.config.address, buf) {
            warn!(%err, "transport read failed, zero-filling");
            buf.fill(0);
        }
    }

    fn read_byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        self.read_into(&mut byte);
        byte[0]
    }

    /// The receive/framing state machine: poll for a frame-start byte,
    /// validate the echoed command, then read the little-endian length and
    /// the payload.
    fn receive(&mut self, expected: Command) -> Result<Response, Error> {
        let expected_byte: u8 = expected.into();
        let start = Instant::now();
        while start.elapsed() < self.config.timeout {
            let status = Status::from_primitive(self.read_byte());
            if status.is_frame_start() {
                let command = self.read_byte();
                if command != expected_byte {
                    // Corrupt or misaligned frame. Ask the peripheral to
                    // flush and realign; no retry within this call.
                    warn!(
                        expected = expected_byte,
                        actual = command,
                        "response command mismatch, resyncing"
                    );
                    self.reset(expected_byte);
                    return Err(Error::CommandMismatch {
                        expected: expected_byte,
                        actual: command,
                    });
                }
                let mut len = [0u8; 2];
                self.read_into(&mut len);
                let length = u16::from_le_bytes(len) as usize;
                let mut payload = vec![0u8; length];
                if length > 0 {
                    self.read_into(&mut payload);
                }
                debug!(
                    command = expected_byte,
                    ?status,
                    length,
                    elapsed = ?start.elapsed(),
                    "received response"
                );
                return Ok(Response {
                    status,
                    command,
                    payload: Bytes::from(payload),
                });
            }
            // Noise in the status position: discard the byte and poll again.
            thread::sleep(self.config.poll_interval);
        }
        warn!(timeout = ?self.config.timeout, "no response frame before the deadline");
        self.reset(Command::Reset.into());
        Err(Error::Timeout(self.config.timeout))
    }

    /// Tell the peripheral to discard its pending transmit buffer. The
    /// single argument byte names the command that triggered the reset (or
    /// the reset opcode itself for a hard reset), then the fixed settle
    /// sleep lets the peripheral recover. No response is awaited.
    pub fn reset(&mut self, target: u8) {
        debug!(target, "sending reset");
        self.send(&CommandPacket::new(Command::Reset, &[target]));
        thread::sleep(self.config.reset_settle);
    }
}
