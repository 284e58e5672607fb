use std::io;

/// Byte-level duplex channel to an addressed peripheral.
///
/// The protocol engine is transport-agnostic; implement this for whatever
/// carries the bytes (an I2C bus, a USB-to-I2C bridge, a mock in tests).
/// Implementations should move bytes as-is and leave framing, retries and
/// timeouts to the engine.
pub trait Transport {
    /// Write `bytes` to the peripheral at `address`.
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()>;

    /// Read exactly `buf.len()` bytes from the peripheral at `address`.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> io::Result<()> {
        (**self).read(address, buf)
    }
}

#[cfg(feature = "hal")]
pub use self::hal::I2cTransport;

#[cfg(feature = "hal")]
mod hal {
    use super::Transport;
    use embedded_hal::i2c::I2c;
    use std::io;

    /// On-wire chunk limit of the hub's I2C slave implementation.
    const MAX_TRANSFER: usize = 32;

    /// Runs the protocol over any blocking [`embedded_hal::i2c::I2c`] bus.
    ///
    /// Transfers are split into 32-byte chunks to stay within the
    /// peripheral's per-transaction buffer.
    pub struct I2cTransport<I> {
        bus: I,
    }

    impl<I> I2cTransport<I> {
        pub fn new(bus: I) -> Self {
            Self { bus }
        }

        pub fn into_inner(self) -> I {
            self.bus
        }
    }

    impl<I: I2c> Transport for I2cTransport<I> {
        fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()> {
            for chunk in bytes.chunks(MAX_TRANSFER) {
                self.bus
                    .write(address, chunk)
                    .map_err(|_| io::Error::other("i2c write failed"))?;
            }
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> io::Result<()> {
            for chunk in buf.chunks_mut(MAX_TRANSFER) {
                self.bus
                    .read(address, chunk)
                    .map_err(|_| io::Error::other("i2c read failed"))?;
            }
            Ok(())
        }
    }
}
