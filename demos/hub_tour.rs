//! Example: drive the full hub API against a simulated peripheral.
//!
//! No hardware required: a small in-process bus double answers every command
//! with plausible canned data. Run with `RUST_LOG=debug` to watch the
//! protocol engine's framing decisions.

use std::collections::VecDeque;
use std::error::Error;
use std::io;

use sensorhub::types::{PortSet, RefreshRate, SkuCategory};
use sensorhub::{SensorHub, Transport};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bus double that answers like a hub with a temperature/humidity sensor on
/// port 1. Each write queues the matching response frame for the reads that
/// follow.
struct SimulatedHub {
    pending: VecDeque<u8>,
}

impl SimulatedHub {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    fn answer(&mut self, command: u8, payload: &[u8]) {
        let len = payload.len() as u16;
        self.pending.push_back(0x53);
        self.pending.push_back(command);
        self.pending.push_back((len & 0xFF) as u8);
        self.pending.push_back((len >> 8) as u8);
        self.pending.extend(payload.iter().copied());
    }
}

impl Transport for SimulatedHub {
    fn write(&mut self, _address: u8, bytes: &[u8]) -> io::Result<()> {
        let command = bytes[0];
        match command {
            0x00 => self.answer(command, b"\x00SEN0334"),
            0x04 => self.answer(command, &[0x00, 0x08, 0x09, 0x09, 0x02, 0x08, 0xE6, 0x07]),
            0x09 => self.answer(command, b"Temp_Air,Humi_Air"),
            0x0A => self.answer(command, b"28.65,30.12"),
            0x0B => self.answer(command, b"C,%RH"),
            0x0D => self.answer(command, b"SEN0334:  Temp_Air:28.65 C,Humi_Air:30.12 %RH"),
            0x19 => self.answer(command, b"09:08:00"),
            0x20 => self.answer(command, &[0x00]),
            0x21 => self.answer(command, &[0x01, 0x00]),
            _ => self.answer(command, &[]),
        }
        Ok(())
    }

    fn read(&mut self, _address: u8, buf: &mut [u8]) -> io::Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.pending.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut hub = SensorHub::new(SimulatedHub::new());

    info!("firmware: {}", hub.version()?);

    let (mode, sku) = hub.port1()?;
    info!("port 1: {mode} sensor, SKU {sku}");

    info!("clock: {}", hub.rtc()?);
    info!("refresh rate: {}", hub.refresh_rate()?);
    info!("refreshed at: {}", hub.timestamp()?);

    info!("keys:   {}", hub.keys(PortSet::PORT1)?);
    info!("values: {}", hub.values(PortSet::PORT1)?);
    info!("units:  {}", hub.units(PortSet::PORT1)?);
    info!("info:   {}", hub.information(PortSet::ALL, true)?);

    info!(
        "analog SKUs supported: {}",
        hub.supported_skus(SkuCategory::Analog)?
    );

    hub.set_refresh_rate(RefreshRate::Seconds1)?;
    info!("refresh rate raised to {}", RefreshRate::Seconds1);

    Ok(())
}
