//! Transactions against a 7-bit address
//!
//! A transaction is START, address byte, data bytes, STOP. Whatever goes
//! wrong after START, a STOP is put on the bus before the error is
//! returned, so the bus is idle again for the next call. Nothing is
//! retried.

use embedded_hal::delay::DelayNs;
use softwire_hal::i2c::{address_byte, Direction};
use softwire_hal::OpenDrainLine;

use super::SoftI2c;
use crate::error::Error;

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    /// Write `data` to the device at `address`
    ///
    /// An empty `data` does nothing: no START, no STOP. Use
    /// [`probe`](Self::probe) to check for a device.
    ///
    /// # Errors
    /// - [`Error::NoAckAddress`] - nobody answered the address
    /// - [`Error::NoAckData`] - the device refused a byte; `written` bytes
    ///   before it were accepted
    /// - [`Error::BusStuck`] - a line did not release in time
    pub fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        self.start()?;
        let result = self.transmit(address, data);
        self.finish(address, result)
    }

    /// Read `buf.len()` bytes from the device at `address`
    ///
    /// Every byte but the last is acknowledged; the last gets a NAK so the
    /// device stops sending. Returns the number of bytes read. An empty
    /// `buf` does nothing and returns 0.
    pub fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, Error> {
        self.read_with_stop(address, buf, true)
    }

    /// Write then read in one transaction, joined by a repeated START
    ///
    /// This is the combined format used for register reads: write the
    /// register number, then read its contents without releasing the bus.
    /// With one side empty this is a plain [`write`](Self::write) or
    /// [`read`](Self::read); with both empty it does nothing.
    pub fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buf: &mut [u8],
    ) -> Result<usize, Error> {
        match (data.is_empty(), buf.is_empty()) {
            (true, true) => Ok(0),
            (false, true) => self.write(address, data).map(|()| 0),
            (true, false) => self.read(address, buf),
            (false, false) => {
                self.start()?;
                let result = self.transmit(address, data).and_then(|()| {
                    self.start()?;
                    self.receive(address, buf)
                });
                self.finish(address, result)
            }
        }
    }

    /// Check whether a device answers at `address`
    ///
    /// Sends only the address byte (write direction) between START and
    /// STOP.
    pub fn probe(&mut self, address: u8) -> Result<bool, Error> {
        self.start()?;
        let result = self.send_byte(address_byte(address, Direction::Write));
        self.finish(address, result)
    }

    /// Read, optionally keeping the bus claimed afterwards
    ///
    /// With `send_stop == false` a successful read ends with SCL low and
    /// the bus still owned; the next [`start`](Self::start) is a repeated
    /// START. Errors always end with a STOP.
    pub(crate) fn read_with_stop(
        &mut self,
        address: u8,
        buf: &mut [u8],
        send_stop: bool,
    ) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.start()?;
        let result = self.receive(address, buf);
        match result {
            Ok(count) if !send_stop => Ok(count),
            result => self.finish(address, result),
        }
    }

    /// Address for writing, then send every byte of `data`
    pub(crate) fn transmit(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.send_address(address, Direction::Write)?;
        for (written, &byte) in data.iter().enumerate() {
            if !self.send_byte(byte)? {
                return Err(Error::NoAckData { written });
            }
        }
        Ok(())
    }

    /// Address for reading, then fill `buf`, NAKing the final byte
    pub(crate) fn receive(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, Error> {
        self.send_address(address, Direction::Read)?;
        let last = buf.len().saturating_sub(1);
        for (index, slot) in buf.iter_mut().enumerate() {
            *slot = self.receive_byte(index != last);
        }
        Ok(buf.len())
    }

    pub(crate) fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        if self.send_byte(address_byte(address, direction))? {
            Ok(())
        } else {
            Err(Error::NoAckAddress)
        }
    }

    /// End a transaction with STOP, keeping the first error
    pub(crate) fn finish<T>(&mut self, address: u8, result: Result<T, Error>) -> Result<T, Error> {
        match result {
            Ok(value) => {
                self.stop()?;
                Ok(value)
            }
            Err(e) => {
                debug!("transaction with {=u8:#x} failed: {}", address, e);
                // Report the original error even if the STOP fails too
                let _ = self.stop();
                Err(e)
            }
        }
    }
}
