use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::info;
use zerocopy::{FromBytes, IntoBytes};

use crate::engine::{EngineConfig, ProtocolEngine};
use crate::error::{Error, ErrorCode};
use crate::packet::{Command, ascii_text};
use crate::rtc::{RtcTime, RtcTimeRaw};
use crate::transport::Transport;
use crate::types::{Port1Mode, Port23Mode, PortSet, RefreshRate, SkuCategory, Version};

/// Factory-default bus address of the hub (0x22 and 0x23 are selectable).
pub const DEFAULT_ADDRESS: u8 = 0x21;

/// Longest SKU the hub accepts, in bytes.
const SKU_LEN: usize = 7;

/// Typed interface to the sensor hub.
///
/// Every method is one blocking request/response exchange on the underlying
/// [`ProtocolEngine`]; see there for the timing and failure contract. Methods
/// returning strings hand back the peripheral's comma-joined ASCII verbatim,
/// without re-parsing its structure.
pub struct SensorHub<T> {
    engine: ProtocolEngine<T>,
}

impl<T: Transport> SensorHub<T> {
    /// Drive a hub at the factory-default address.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, EngineConfig::new(DEFAULT_ADDRESS))
    }

    pub fn with_config(transport: T, config: EngineConfig) -> Self {
        Self {
            engine: ProtocolEngine::new(transport, config),
        }
    }

    /// Raise the receive deadline when many sensors make responses slow.
    pub fn set_recv_timeout(&mut self, timeout: Duration) {
        self.engine.set_timeout(timeout);
    }

    pub fn engine_mut(&mut self) -> &mut ProtocolEngine<T> {
        &mut self.engine
    }

    /// Firmware version of the hub.
    pub fn version(&mut self) -> Result<Version, Error> {
        let payload = self.engine.exchange(Command::Version, &[])?.into_payload()?;
        if payload.len() != 2 {
            return Err(Error::InsufficientData {
                expected: 2,
                actual: payload.len(),
            });
        }
        Ok(Version::from_raw(u16::from_be_bytes([payload[0], payload[1]])))
    }

    /// Select the sensor on port 1 by SKU. `"NULL"` clears the port,
    /// `"Analog"` reads raw voltage in mV; any other SKU switches the port
    /// to the matching analog or digital mode.
    pub fn set_port1(&mut self, sku: &str) -> Result<(), Error> {
        self.set_port(Command::Port1, sku)
    }

    /// Current mode and configured SKU of port 1.
    pub fn port1(&mut self) -> Result<(Port1Mode, String), Error> {
        let (mode, sku) = self.read_port(Command::Port1)?;
        let mode = Port1Mode::try_from(mode)
            .map_err(|_| Error::InvalidResponse(format!("unknown port 1 mode {mode:#04x}")))?;
        Ok((mode, sku))
    }

    /// Select the UART sensor on port 2 by SKU, or `"NULL"` for I2C mode
    /// (I2C sensors are auto-detected).
    pub fn set_port2(&mut self, sku: &str) -> Result<(), Error> {
        self.set_port(Command::Port2, sku)
    }

    pub fn port2(&mut self) -> Result<(Port23Mode, String), Error> {
        let (mode, sku) = self.read_port(Command::Port2)?;
        let mode = Port23Mode::try_from(mode)
            .map_err(|_| Error::InvalidResponse(format!("unknown port 2 mode {mode:#04x}")))?;
        Ok((mode, sku))
    }

    /// Select the UART sensor on port 3 by SKU, or `"NULL"` for I2C mode.
    pub fn set_port3(&mut self, sku: &str) -> Result<(), Error> {
        self.set_port(Command::Port3, sku)
    }

    pub fn port3(&mut self) -> Result<(Port23Mode, String), Error> {
        let (mode, sku) = self.read_port(Command::Port3)?;
        let mode = Port23Mode::try_from(mode)
            .map_err(|_| Error::InvalidResponse(format!("unknown port 3 mode {mode:#04x}")))?;
        Ok((mode, sku))
    }

    /// Move the hub to a new bus address. Takes effect on the peripheral
    /// after power-cycle, but the session retargets immediately on success.
    pub fn set_address(&mut self, address: u8) -> Result<(), Error> {
        self.engine
            .exchange(Command::Address, &[address])?
            .into_payload()?;
        info!(address, "hub acknowledged address change");
        self.engine.set_address(address);
        Ok(())
    }

    /// Bus address as reported by the hub itself.
    pub fn address(&mut self) -> Result<u8, Error> {
        let payload = self.engine.exchange(Command::Address, &[])?.into_payload()?;
        payload.first().copied().ok_or(Error::InsufficientData {
            expected: 1,
            actual: 0,
        })
    }

    /// Set the on-board clock.
    pub fn set_rtc(&mut self, time: RtcTime) -> Result<(), Error> {
        let raw = RtcTimeRaw::from(time);
        self.engine
            .exchange(Command::RtcTime, raw.as_bytes())?
            .into_payload()?;
        Ok(())
    }

    /// Set the on-board clock from calendar fields, deriving the weekday.
    pub fn set_rtc_ymd_hms(
        &mut self,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), Error> {
        let time = RtcTime::from_ymd_hms(year, month, day, hour, minute, second)
            .ok_or(Error::Device(ErrorCode::InvalidArgs))?;
        self.set_rtc(time)
    }

    pub fn set_rtc_datetime(&mut self, dt: NaiveDateTime) -> Result<(), Error> {
        self.set_rtc(RtcTime::from_datetime(dt))
    }

    /// Read the on-board clock.
    pub fn rtc(&mut self) -> Result<RtcTime, Error> {
        let payload = self.engine.exchange(Command::RtcTime, &[])?.into_payload()?;
        let raw = RtcTimeRaw::read_from_bytes(payload.as_ref()).map_err(|_| {
            Error::InsufficientData {
                expected: size_of::<RtcTimeRaw>(),
                actual: payload.len(),
            }
        })?;
        Ok(RtcTime::from(raw))
    }

    /// Start recording sensor data to the hub's date-stamped CSV file.
    pub fn enable_record(&mut self) -> Result<(), Error> {
        self.engine.exchange(Command::RecordOn, &[])?.into_payload()?;
        Ok(())
    }

    pub fn disable_record(&mut self) -> Result<(), Error> {
        self.engine.exchange(Command::RecordOff, &[])?.into_payload()?;
        Ok(())
    }

    /// Switch the on-board display on.
    pub fn screen_on(&mut self) -> Result<(), Error> {
        self.engine.exchange(Command::ScreenOn, &[])?.into_payload()?;
        Ok(())
    }

    pub fn screen_off(&mut self) -> Result<(), Error> {
        self.engine.exchange(Command::ScreenOff, &[])?.into_payload()?;
        Ok(())
    }

    /// Data names of the sensors on the selected ports, comma-joined,
    /// e.g. `Temp_Air,Humi_Air`.
    pub fn keys(&mut self, ports: PortSet) -> Result<String, Error> {
        self.string_query(Command::GetName, &[ports.bits()])
    }

    /// Data values of the sensors on the selected ports, comma-joined,
    /// e.g. `28.65,30.12`.
    pub fn values(&mut self, ports: PortSet) -> Result<String, Error> {
        self.string_query(Command::GetValue, &[ports.bits()])
    }

    /// Data units of the sensors on the selected ports, comma-joined,
    /// e.g. `C,%RH`.
    pub fn units(&mut self, ports: PortSet) -> Result<String, Error> {
        self.string_query(Command::GetUnit, &[ports.bits()])
    }

    /// SKUs of the sensors on the selected ports, comma-joined.
    pub fn skus(&mut self, ports: PortSet) -> Result<String, Error> {
        self.string_query(Command::GetSku, &[ports.bits()])
    }

    /// Full `name:value unit` records for the selected ports, comma-joined,
    /// optionally prefixed with the refresh timestamp.
    pub fn information(&mut self, ports: PortSet, timestamped: bool) -> Result<String, Error> {
        self.string_query(Command::GetInfo, &[ports.bits(), timestamped as u8])
    }

    /// Values of the attribute named `key` across all ports.
    pub fn value_by_key(&mut self, key: &str) -> Result<String, Error> {
        self.string_query(Command::KeyValueAll, key.as_bytes())
    }

    /// Values of the attribute named `key` on the selected ports.
    pub fn value_by_key_on(&mut self, ports: PortSet, key: &str) -> Result<String, Error> {
        self.string_query(Command::KeyValuePort, &keyed_args(ports, None, key))
    }

    /// Values of the attribute named `key` from the sensor with the given
    /// SKU on the selected ports.
    pub fn value_by_key_of(
        &mut self,
        ports: PortSet,
        sku: &str,
        key: &str,
    ) -> Result<String, Error> {
        self.string_query(Command::KeyValueSku, &keyed_args(ports, Some(sku), key))
    }

    /// Units of the attribute named `key` across all ports.
    pub fn unit_by_key(&mut self, key: &str) -> Result<String, Error> {
        self.string_query(Command::KeyUnitAll, key.as_bytes())
    }

    pub fn unit_by_key_on(&mut self, ports: PortSet, key: &str) -> Result<String, Error> {
        self.string_query(Command::KeyUnitPort, &keyed_args(ports, None, key))
    }

    pub fn unit_by_key_of(
        &mut self,
        ports: PortSet,
        sku: &str,
        key: &str,
    ) -> Result<String, Error> {
        self.string_query(Command::KeyUnitSku, &keyed_args(ports, Some(sku), key))
    }

    /// SKU list the hub supports for one sensor category, comma-joined.
    pub fn supported_skus(&mut self, category: SkuCategory) -> Result<String, Error> {
        let command = match category {
            SkuCategory::Analog => Command::SkuListAnalog,
            SkuCategory::Digital => Command::SkuListDigital,
            SkuCategory::I2c => Command::SkuListI2c,
            SkuCategory::Uart => Command::SkuListUart,
        };
        self.string_query(command, &[])
    }

    /// Refresh timestamp of the current readings, `HH:MM:SS` or
    /// `MM:SS.CC`.
    pub fn timestamp(&mut self) -> Result<String, Error> {
        self.string_query(Command::Timestamp, &[])
    }

    pub fn set_refresh_rate(&mut self, rate: RefreshRate) -> Result<(), Error> {
        self.engine
            .exchange(Command::RefreshRate, &[rate.into()])?
            .into_payload()?;
        Ok(())
    }

    /// The configured refresh-rate level. The actual rate may be faster;
    /// the level is only a lower bound.
    pub fn refresh_rate(&mut self) -> Result<RefreshRate, Error> {
        let payload = self
            .engine
            .exchange(Command::RefreshRate, &[])?
            .into_payload()?;
        let rate = payload.first().copied().ok_or(Error::InsufficientData {
            expected: 1,
            actual: 0,
        })?;
        RefreshRate::try_from(rate)
            .map_err(|_| Error::InvalidResponse(format!("unknown refresh rate {rate:#04x}")))
    }

    fn set_port(&mut self, command: Command, sku: &str) -> Result<(), Error> {
        // Over-long SKUs are rejected locally; the peripheral would only
        // echo the same code back.
        if sku.len() > SKU_LEN {
            return Err(Error::Device(ErrorCode::InvalidArgs));
        }
        self.engine.exchange(command, sku.as_bytes())?.into_payload()?;
        Ok(())
    }

    /// Shared read path of the three port-config commands: byte 0 is the
    /// mode, the rest is the SKU text.
    fn read_port(&mut self, command: Command) -> Result<(u8, String), Error> {
        let payload = self.engine.exchange(command, &[])?.into_payload()?;
        let mode = *payload.first().ok_or(Error::InsufficientData {
            expected: 1,
            actual: 0,
        })?;
        Ok((mode, trimmed_text(&payload[1..])))
    }

    fn string_query(&mut self, command: Command, args: &[u8]) -> Result<String, Error> {
        let payload = self.engine.exchange(command, args)?.into_payload()?;
        Ok(trimmed_text(&payload))
    }
}

/// `ports` byte, optional SKU padded to its fixed 7-byte field, then the
/// key text.
fn keyed_args(ports: PortSet, sku: Option<&str>, key: &str) -> Vec<u8> {
    let mut args = Vec::with_capacity(1 + SKU_LEN + key.len());
    args.push(ports.bits());
    if let Some(sku) = sku {
        let mut field = [0u8; SKU_LEN];
        let n = sku.len().min(SKU_LEN);
        field[..n].copy_from_slice(&sku.as_bytes()[..n]);
        args.extend_from_slice(&field);
    }
    args.extend_from_slice(key.as_bytes());
    args
}

/// Decode ASCII byte-per-character and drop the trailing NULs some firmware
/// revisions append to their strings.
fn trimmed_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    ascii_text(&bytes[..end])
}
