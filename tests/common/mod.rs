// Shared across the test binaries; not every item is used in each one.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use sensorhub::{EngineConfig, Transport};

pub const ADDRESS: u8 = 0x21;

pub const STATUS_SUCCESS: u8 = 0x53;
pub const STATUS_FAILED: u8 = 0x63;

/// Scripted bus double. Queued bytes are served to reads one at a time;
/// writes are recorded per call together with the address they targeted.
/// An exhausted read queue serves zeroes, like a silent bus.
#[derive(Default)]
pub struct MockTransport {
    reads: VecDeque<u8>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub fail_reads: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes ahead of the next frame (noise, partial frames).
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.reads.extend(bytes.iter().copied());
    }

    /// Queue one complete response frame.
    pub fn push_frame(&mut self, status: u8, command: u8, payload: &[u8]) {
        let len = payload.len() as u16;
        self.reads.push_back(status);
        self.reads.push_back(command);
        self.reads.push_back((len & 0xFF) as u8);
        self.reads.push_back((len >> 8) as u8);
        self.reads.extend(payload.iter().copied());
    }
}

/// Decode a hex frame dump into bytes.
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("valid hex")
}

impl Transport for MockTransport {
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()> {
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }

    fn read(&mut self, _address: u8, buf: &mut [u8]) -> io::Result<()> {
        if self.fail_reads {
            return Err(io::Error::other("bus read failed"));
        }
        for slot in buf.iter_mut() {
            *slot = self.reads.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}

/// Engine config with short timings so failure-path tests stay fast.
pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::new(ADDRESS);
    config.timeout = Duration::from_millis(100);
    config.poll_interval = Duration::from_millis(5);
    config.reset_settle = Duration::ZERO;
    config
}
