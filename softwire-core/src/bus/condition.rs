//! START and STOP conditions
//!
//! Both are the only places where SDA changes while SCL is high.

use embedded_hal::delay::DelayNs;
use softwire_hal::OpenDrainLine;

use super::SoftI2c;
use crate::error::Error;

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OpenDrainLine,
    SDA: OpenDrainLine,
    D: DelayNs,
{
    /// Put a START (or repeated START) condition on the bus
    ///
    /// Releases both lines and waits for the bus to read idle, then pulls
    /// SDA low under a high SCL. Returns with SCL low, ready for the first
    /// bit.
    pub fn start(&mut self) -> Result<(), Error> {
        self.sda.release();
        self.scl.release();
        self.wait_bus_released()?;

        self.sda.drive_low();
        self.hold();
        self.scl.drive_low();
        self.hold();
        Ok(())
    }

    /// Put a STOP condition on the bus and wait for it to go idle
    ///
    /// SDA is pulled low while SCL is still low first, so its release
    /// under a high SCL is always a real rising edge even when the last
    /// bit on the bus left SDA high.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.scl.drive_low();
        self.sda.drive_low();
        self.hold();

        self.scl.release();
        self.hold();
        self.sda.release();
        self.hold();
        self.wait_bus_released()
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::{Signal, SimBus, SimSlave, WireEvent};
    use crate::{Error, SoftI2c, Timing};

    #[test]
    fn test_start_then_stop() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        assert!(!sim.level(Signal::Scl));
        assert!(!sim.level(Signal::Sda));

        i2c.stop().unwrap();
        assert!(sim.level(Signal::Scl));
        assert!(sim.level(Signal::Sda));

        assert_eq!(
            sim.events().as_slice(),
            &[WireEvent::Start, WireEvent::Stop]
        );
    }

    #[test]
    fn test_repeated_start() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        i2c.start().unwrap();
        i2c.stop().unwrap();

        assert_eq!(
            sim.events().as_slice(),
            &[WireEvent::Start, WireEvent::Start, WireEvent::Stop]
        );
    }

    #[test]
    fn test_start_holds_for_bit_periods() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        assert_eq!(sim.elapsed_ns(), 2 * u64::from(Timing::DEFAULT_BIT_DELAY_NS));
    }

    #[test]
    fn test_start_on_stuck_data_line() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let timing = Timing::default().with_max_wait_polls(16);
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);

        sim.set_stuck(Some(Signal::Sda));
        sim.clear_events();
        assert_eq!(i2c.start(), Err(Error::BusStuck));
        assert!(sim.events().is_empty());

        sim.set_stuck(None);
        assert_eq!(i2c.start(), Ok(()));
    }

    #[test]
    fn test_stop_on_stuck_clock_line() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let timing = Timing::default().with_max_wait_polls(4);
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);

        i2c.start().unwrap();
        sim.set_stuck(Some(Signal::Scl));
        assert_eq!(i2c.stop(), Err(Error::BusStuck));
    }
}
