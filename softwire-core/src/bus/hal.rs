//! Trait implementations for driver crates
//!
//! - [`softwire_hal::I2cBus`], the workspace's own bus trait
//! - [`embedded_hal::i2c::I2c`], so any `embedded-hal` device driver can
//!   sit on top of a bit-banged bus
//!
//! The `embedded-hal` contract differs from the inherent methods in one
//! respect: an empty write still puts the address on the bus, so
//! `write(addr, &[])` through the trait answers whether a device is present,
//! as device drivers and bus scanners expect. Empty reads are skipped; the
//! master cannot end a read without clocking a byte to NAK.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use softwire_hal::i2c::Direction;
use softwire_hal::{I2cBus, OpenDrainLine};

use super::SoftI2c;
use crate::error::Error;

impl<SCL, SDA, D> I2cBus for SoftI2c<SCL, SDA, D>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        SoftI2c::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Error> {
        SoftI2c::read(self, address, buf).map(|_| ())
    }

    fn write_read(&mut self, address: u8, write_data: &[u8], read_buf: &mut [u8]) -> Result<(), Error> {
        SoftI2c::write_read(self, address, write_data, read_buf).map(|_| ())
    }
}

impl<SCL, SDA, D> ErrorType for SoftI2c<SCL, SDA, D> {
    type Error = Error;
}

impl<SCL, SDA, D> I2c<SevenBitAddress> for SoftI2c<SCL, SDA, D>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Error> {
        if operations.iter().all(is_empty_read) {
            return Ok(());
        }
        self.start()?;
        let result = self.run_operations(address, operations);
        self.finish(address, result)
    }
}

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    /// Execute a transaction body; START already issued, STOP left to caller
    ///
    /// Adjacent operations of the same direction are merged into one
    /// transfer. A change of direction gets a repeated START and a fresh
    /// address byte. In a run of reads only the very last byte is NAKed.
    /// Empty reads take no part in the transfer.
    fn run_operations(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Error> {
        let mut previous: Option<Direction> = None;
        // bytes the slave accepted so far in the current write run
        let mut run_written = 0usize;

        for index in 0..operations.len() {
            if is_empty_read(&operations[index]) {
                continue;
            }

            let direction = direction_of(&operations[index]);
            if previous != Some(direction) {
                if previous.is_some() {
                    self.start()?;
                }
                self.send_address(address, direction)?;
                run_written = 0;
            }

            let read_continues = matches!(
                operations[index + 1..].iter().find(|op| !is_empty_read(op)),
                Some(Operation::Read(_))
            );

            match &mut operations[index] {
                Operation::Write(bytes) => {
                    for (i, &byte) in bytes.iter().enumerate() {
                        if !self.send_byte(byte)? {
                            return Err(Error::NoAckData { written: run_written + i });
                        }
                    }
                    run_written += bytes.len();
                }
                Operation::Read(buf) => {
                    let len = buf.len();
                    for (i, slot) in buf.iter_mut().enumerate() {
                        let last = !read_continues && i + 1 == len;
                        *slot = self.receive_byte(!last);
                    }
                }
            }

            previous = Some(direction);
        }
        Ok(())
    }
}

fn direction_of(operation: &Operation<'_>) -> Direction {
    match operation {
        Operation::Read(_) => Direction::Read,
        Operation::Write(_) => Direction::Write,
    }
}

fn is_empty_read(operation: &Operation<'_>) -> bool {
    matches!(operation, Operation::Read(buf) if buf.is_empty())
}
