//! Arduino `Wire`-style façade
//!
//! [`RxBuffer`] stores the bytes of one read request and hands them out one
//! at a time. [`Wire`] bundles a bus with a buffer and offers the familiar
//! `begin_transmission` / `write` / `end_transmission` and
//! `request_from` / `available` / `read` calls.
//!
//! Writes are not buffered: every `write` puts its byte on the wire
//! immediately and reports the slave's acknowledge.

use embedded_hal::delay::DelayNs;
use softwire_hal::i2c::Direction;
use softwire_hal::OpenDrainLine;

use crate::bus::SoftI2c;
use crate::error::Error;

/// Default receive buffer capacity
pub const RX_BUFFER_LENGTH: usize = 8;

/// Fixed-capacity buffer for received bytes with a read cursor
///
/// Invariant: `cursor <= len <= N`.
#[derive(Debug, Clone)]
pub struct RxBuffer<const N: usize = RX_BUFFER_LENGTH> {
    data: [u8; N],
    len: usize,
    cursor: usize,
}

impl<const N: usize> RxBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            len: 0,
            cursor: 0,
        }
    }

    /// Maximum number of bytes one request can store
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Read up to `count` bytes from `address` into the buffer
    ///
    /// `count` is clamped to the capacity. With `send_stop == false` the
    /// bus stays claimed after a successful read, so the next transfer
    /// begins with a repeated START.
    ///
    /// Returns the number of bytes stored. A slave that does not answer
    /// its address, or a stuck bus, yields 0. Previously buffered bytes
    /// are discarded either way.
    pub fn request<SCL, SDA, D>(
        &mut self,
        bus: &mut SoftI2c<SCL, SDA, D>,
        address: u8,
        count: u8,
        send_stop: bool,
    ) -> u8
    where
        SCL: OpenDrainLine,
        SDA: OpenDrainLine,
        D: DelayNs,
    {
        let wanted = usize::from(count).min(N);
        self.len = match bus.read_with_stop(address, &mut self.data[..wanted], send_stop) {
            Ok(read) => read,
            Err(e) => {
                debug!("request from {=u8:#x} failed: {}", address, e);
                0
            }
        };
        self.cursor = 0;
        // len <= count, so it fits
        self.len as u8
    }

    /// Number of received bytes not yet read
    pub fn available(&self) -> u8 {
        (self.len - self.cursor) as u8
    }

    /// Next received byte, or `None` once the buffer is exhausted
    pub fn read_next(&mut self) -> Option<u8> {
        if self.cursor < self.len {
            let byte = self.data[self.cursor];
            self.cursor += 1;
            Some(byte)
        } else {
            None
        }
    }

    /// The unread bytes
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.cursor..self.len]
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.len = 0;
        self.cursor = 0;
    }
}

impl<const N: usize> Default for RxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A bus plus a receive buffer, driven like Arduino's `Wire`
pub struct Wire<SCL, SDA, D, const N: usize = RX_BUFFER_LENGTH> {
    bus: SoftI2c<SCL, SDA, D>,
    rx: RxBuffer<N>,
    tx_address: u8,
    tx_written: usize,
}

impl<SCL, SDA, D, const N: usize> Wire<SCL, SDA, D, N>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    /// Wrap a bus with an empty receive buffer
    pub fn new(bus: SoftI2c<SCL, SDA, D>) -> Self {
        Self {
            bus,
            rx: RxBuffer::new(),
            tx_address: 0,
            tx_written: 0,
        }
    }

    /// Claim the bus and address `address` for writing
    ///
    /// On NAK the bus is released again with a STOP.
    pub fn begin_transmission(&mut self, address: u8) -> Result<(), Error> {
        self.tx_address = address;
        self.tx_written = 0;
        self.bus.start()?;
        let result = self.bus.send_address(address, Direction::Write);
        if result.is_err() {
            return self.bus.finish(address, result);
        }
        Ok(())
    }

    /// Send one byte of the current transmission
    ///
    /// Call only after a successful [`begin_transmission`](Self::begin_transmission).
    /// A NAK ends the transmission with a STOP and reports how many bytes
    /// were accepted before it.
    pub fn write(&mut self, byte: u8) -> Result<(), Error> {
        match self.bus.send_byte(byte) {
            Ok(true) => {
                self.tx_written += 1;
                Ok(())
            }
            Ok(false) => {
                let written = self.tx_written;
                self.bus.finish(self.tx_address, Err(Error::NoAckData { written }))
            }
            Err(e) => self.bus.finish(self.tx_address, Err(e)),
        }
    }

    /// Release the bus with a STOP
    pub fn end_transmission(&mut self) -> Result<(), Error> {
        self.bus.stop()
    }

    /// See [`RxBuffer::request`]
    pub fn request_from(&mut self, address: u8, count: u8, send_stop: bool) -> u8 {
        self.rx.request(&mut self.bus, address, count, send_stop)
    }

    /// See [`RxBuffer::available`]
    pub fn available(&self) -> u8 {
        self.rx.available()
    }

    /// Next received byte, see [`RxBuffer::read_next`]
    pub fn read(&mut self) -> Option<u8> {
        self.rx.read_next()
    }

    /// Borrow the underlying bus
    pub fn bus(&self) -> &SoftI2c<SCL, SDA, D> {
        &self.bus
    }

    /// Mutably borrow the underlying bus
    pub fn bus_mut(&mut self) -> &mut SoftI2c<SCL, SDA, D> {
        &mut self.bus
    }

    /// Give back the underlying bus
    pub fn into_inner(self) -> SoftI2c<SCL, SDA, D> {
        self.bus
    }
}
