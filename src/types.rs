use std::fmt;
use std::ops::BitOr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

/// Selection mask for the hub's physical sensor ports.
/// Bit 0 is port 1, bit 1 port 2, bit 2 port 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortSet(u8);

impl PortSet {
    pub const PORT1: PortSet = PortSet(1 << 0);
    pub const PORT2: PortSet = PortSet(1 << 1);
    pub const PORT3: PortSet = PortSet(1 << 2);
    pub const ALL: PortSet = PortSet(0x07);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: PortSet) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PortSet {
    type Output = PortSet;

    fn bitor(self, rhs: PortSet) -> PortSet {
        PortSet(self.0 | rhs.0)
    }
}

impl Default for PortSet {
    fn default() -> Self {
        PortSet::ALL
    }
}

/// Operating mode of port 1, which hosts analog or digital sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Port1Mode {
    #[strum(to_string = "ANALOG")]
    Analog = 0,
    #[strum(to_string = "DIGITAL")]
    Digital = 1,
}

/// Operating mode of ports 2 and 3, which host I2C or UART sensors.
/// I2C sensors are auto-detected at power-on; UART sensors are selected by
/// SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Port23Mode {
    #[strum(to_string = "I2C")]
    I2c = 0,
    #[strum(to_string = "UART")]
    Uart = 1,
}

/// Data refresh rate of the hub. `Millisecond` means "as fast as the
/// sensors actually refresh"; the other levels are lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RefreshRate {
    #[default]
    #[strum(to_string = "ms")]
    Millisecond = 0,
    #[strum(to_string = "1s")]
    Seconds1 = 1,
    #[strum(to_string = "3s")]
    Seconds3 = 2,
    #[strum(to_string = "5s")]
    Seconds5 = 3,
    #[strum(to_string = "10s")]
    Seconds10 = 4,
    #[strum(to_string = "30s")]
    Seconds30 = 5,
    #[strum(to_string = "1min")]
    Minutes1 = 6,
    #[strum(to_string = "5min")]
    Minutes5 = 7,
    #[strum(to_string = "10min")]
    Minutes10 = 8,
}

impl RefreshRate {
    /// The configured lower bound in milliseconds (0 for `Millisecond`).
    pub fn as_millis(&self) -> u32 {
        match self {
            RefreshRate::Millisecond => 0,
            RefreshRate::Seconds1 => 1_000,
            RefreshRate::Seconds3 => 3_000,
            RefreshRate::Seconds5 => 5_000,
            RefreshRate::Seconds10 => 10_000,
            RefreshRate::Seconds30 => 30_000,
            RefreshRate::Minutes1 => 60_000,
            RefreshRate::Minutes5 => 300_000,
            RefreshRate::Minutes10 => 600_000,
        }
    }
}

/// Which supported-SKU list to fetch from the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkuCategory {
    Analog,
    Digital,
    I2c,
    Uart,
}

/// Firmware version of the hub.
///
/// The raw value packs three fields: bits 15-8 are the major number, bits
/// 7-4 the minor, bits 3-0 the patch. `0x0123` renders as `V1.2.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version(u16);

impl Version {
    pub const fn from_raw(raw: u16) -> Self {
        Version(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn major(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn minor(self) -> u8 {
        ((self.0 >> 4) & 0x0F) as u8
    }

    pub const fn patch(self) -> u8 {
        (self.0 & 0x0F) as u8
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
