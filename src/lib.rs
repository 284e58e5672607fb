//! Host-side driver for a multi-port sensor acquisition hub reachable over
//! I2C.
//!
//! The hub multiplexes three physical sensor ports and exposes its
//! configuration (port modes, bus address, RTC, refresh rate, CSV recording,
//! display) and computed readings (name/value/unit/SKU strings) through one
//! fixed binary request/response protocol. This crate implements that
//! protocol: packet framing, a blocking receive loop with timeout and
//! resynchronization, the wire error taxonomy, and typed wrappers for every
//! operation the hub understands.
//!
//! The bus itself is an injected collaborator: anything implementing
//! [`Transport`] can carry the protocol (a real I2C bus, a serial bridge, a
//! mock in tests).

pub mod engine;
pub mod error;
pub mod hub;
pub mod packet;
pub mod rtc;
pub mod transport;
pub mod types;

pub use engine::{EngineConfig, ProtocolEngine};
pub use error::{Error, ErrorCode};
pub use hub::{DEFAULT_ADDRESS, SensorHub};
pub use transport::Transport;
