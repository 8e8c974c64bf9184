//! Bit-banged I2C master
//!
//! [`SoftI2c`] owns the two bus lines, a delay provider and the bit
//! timing. The protocol is split over the submodules:
//!
//! - `condition`: START / STOP
//! - `transceiver`: one byte out or in, plus its acknowledge bit
//! - `transaction`: complete transfers against a 7-bit address
//! - `hal`: [`softwire_hal::I2cBus`] and `embedded-hal` trait impls
//!
//! All operations block until the bus sequence is complete. Sharing one
//! bus between tasks requires a mutex around the whole `SoftI2c`, held for
//! the duration of each transaction.

mod condition;
mod hal;
mod transaction;
mod transceiver;

use embedded_hal::delay::DelayNs;
use softwire_hal::OpenDrainLine;

use crate::config::Timing;
use crate::error::Error;

/// Software I2C bus master
pub struct SoftI2c<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    timing: Timing,
}

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    /// Create a bus master on two lines
    ///
    /// Both lines are released so the bus starts idle.
    pub fn new(mut scl: SCL, mut sda: SDA, delay: D, timing: Timing) -> Self {
        sda.release();
        scl.release();
        Self {
            scl,
            sda,
            delay,
            timing,
        }
    }

    /// Bit timing in use
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Tear the bus down and return its parts
    pub fn release(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    /// Wait one bit period
    fn hold(&mut self) {
        self.delay.delay_ns(self.timing.bit_delay_ns);
    }

    /// Poll until both lines read high
    fn wait_bus_released(&mut self) -> Result<(), Error> {
        let mut polls = self.timing.max_wait_polls;
        loop {
            // Sample both: a stretched clock must see its sample taken
            let sda = self.sda.is_high();
            let scl = self.scl.is_high();
            if sda && scl {
                return Ok(());
            }
            if polls == 0 {
                warn!("bus not released (scl={}, sda={})", scl, sda);
                return Err(Error::BusStuck);
            }
            polls -= 1;
        }
    }

    /// Poll until the clock reads high, giving a slave time to stretch it
    fn wait_clock_released(&mut self) -> Result<(), Error> {
        let mut polls = self.timing.max_wait_polls;
        while !self.scl.is_high() {
            if polls == 0 {
                warn!("clock held low by slave");
                return Err(Error::BusStuck);
            }
            polls -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use softwire_hal::OpenDrainLine;

    use crate::sim::{Signal, SimBus, SimSlave};
    use crate::{SoftI2c, Timing};

    #[test]
    fn test_new_releases_both_lines() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let (mut scl, mut sda) = (sim.scl(), sim.sda());
        scl.drive_low();
        sda.drive_low();

        let _i2c = SoftI2c::new(scl, sda, sim.delay(), Timing::default());
        assert!(sim.level(Signal::Scl));
        assert!(sim.level(Signal::Sda));
    }

    #[test]
    fn test_release_returns_parts() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::FAST);
        assert_eq!(i2c.timing(), &Timing::FAST);

        let (mut scl, _sda, _delay) = i2c.release();
        scl.drive_low();
        assert!(!sim.level(Signal::Scl));
    }
}
