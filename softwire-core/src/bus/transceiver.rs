//! Byte transceiver
//!
//! Bytes travel MSB first. Data only changes while SCL is low and is
//! sampled by the receiver while SCL is high. Every byte is followed by an
//! acknowledge bit driven by the receiver: low means ACK, high means NAK.

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
    /// Clock one byte out and sample the slave's acknowledge bit
    ///
    /// Must be called with SCL low (after [`start`](Self::start) or a
    /// previous byte). Returns `Ok(true)` if the slave acknowledged.
    ///
    /// A slave may stretch the clock before the acknowledge bit; this
    /// waits for SCL to be released, up to `Timing::max_wait_polls`.
    pub fn send_byte(&mut self, byte: u8) -> Result<bool, Error> {
        for bit in (0..8).rev() {
            self.sda.set_level(byte & (1 << bit) != 0);
            self.hold();
            self.scl.release();
            self.hold();
            self.scl.drive_low();
        }

        // Acknowledge bit, driven by the slave
        self.sda.release();
        self.hold();
        self.scl.release();
        self.hold();
        self.wait_clock_released()?;
        let ack = self.sda.is_low();
        self.scl.drive_low();
        self.hold();

        trace!("sent {=u8:#x}, ack={}", byte, ack);
        Ok(ack)
    }

    /// Clock one byte in, then answer with ACK (`ack == true`) or NAK
    ///
    /// NAK tells the slave to stop transmitting; it is sent after the last
    /// byte of a read. Returns with SCL low and SDA released.
    pub fn receive_byte(&mut self, ack: bool) -> u8 {
        let mut byte = 0u8;

        self.sda.release();
        for _ in 0..8 {
            self.scl.release();
            self.hold();
            byte = (byte << 1) | u8::from(self.sda.is_high());
            self.scl.drive_low();
            self.hold();
        }

        if ack {
            self.sda.drive_low();
        }
        self.hold();
        self.scl.release();
        self.hold();
        self.scl.drive_low();
        self.hold();
        self.sda.release();

        trace!("received {=u8:#x}, ack={}", byte, ack);
        byte
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::{Signal, SimBus, SimSlave, WireEvent};
    use crate::{Error, SoftI2c, Timing};

    #[test]
    fn test_send_byte_msb_first() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        // 0xA0 addresses the slave for writing, so it acknowledges
        assert_eq!(i2c.send_byte(0xA0), Ok(true));
        assert_eq!(i2c.send_byte(0x01), Ok(true));

        assert_eq!(
            sim.events().as_slice(),
            &[WireEvent::Start, WireEvent::ack(0xA0), WireEvent::ack(0x01)]
        );
    }

    #[test]
    fn test_send_byte_without_listener() {
        let sim = SimBus::new(SimSlave::new(0x50));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        assert_eq!(i2c.send_byte(0x42), Ok(false));
        assert!(!sim.level(Signal::Scl));
        assert_eq!(
            sim.events().as_slice(),
            &[WireEvent::Start, WireEvent::nak(0x42)]
        );
    }

    #[test]
    fn test_send_byte_waits_for_stretched_clock() {
        let sim = SimBus::new(SimSlave::new(0x50));
        sim.set_clock_stretch(25);
        let timing = Timing::default().with_max_wait_polls(100);
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);

        i2c.start().unwrap();
        assert_eq!(i2c.send_byte(0xA0), Ok(true));
        assert_eq!(i2c.send_byte(0x10), Ok(true));
    }

    #[test]
    fn test_send_byte_gives_up_on_long_stretch() {
        let sim = SimBus::new(SimSlave::new(0x50));
        sim.set_clock_stretch(50);
        let timing = Timing::default().with_max_wait_polls(10);
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);

        i2c.start().unwrap();
        assert_eq!(i2c.send_byte(0xA0), Err(Error::BusStuck));
    }

    #[test]
    fn test_receive_byte_ack_and_nak() {
        let sim = SimBus::new(SimSlave::new(0x50).with_memory(&[0x3C, 0xC3]));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        assert_eq!(i2c.send_byte(0xA1), Ok(true));
        assert_eq!(i2c.receive_byte(true), 0x3C);
        assert_eq!(i2c.receive_byte(false), 0xC3);
        i2c.stop().unwrap();

        assert_eq!(
            sim.events().as_slice(),
            &[
                WireEvent::Start,
                WireEvent::ack(0xA1),
                WireEvent::ack(0x3C),
                WireEvent::nak(0xC3),
                WireEvent::Stop,
            ]
        );
        assert_eq!(sim.with_slave(|s| (s.master_acks(), s.master_naks())), (1, 1));
    }

    #[test]
    fn test_receive_byte_leaves_data_released() {
        let sim = SimBus::new(SimSlave::new(0x50).with_memory(&[0x00]));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        i2c.start().unwrap();
        i2c.send_byte(0xA1).unwrap();
        assert_eq!(i2c.receive_byte(false), 0x00);
        assert!(sim.level(Signal::Sda));
        assert!(!sim.level(Signal::Scl));
    }
}
