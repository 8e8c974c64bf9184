//! Open-drain line on an RP2040 GPIO
//!
//! The RP2040 pads have no open-drain mode, so it is emulated with the
//! output enable: released means input (the pull-up wins), driven means
//! output at level 0. The output level is parked at 0 once and never
//! raised.

use embassy_rp::gpio::{Flex, Pin, Pull};
use embassy_rp::Peri;
use softwire_hal::OpenDrainLine;

pub struct FlexLine<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexLine<'d> {
    /// Configure `pin` as a released open-drain line
    pub fn new(pin: Peri<'d, impl Pin>, pull_up: bool) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(if pull_up { Pull::Up } else { Pull::None });
        pin.set_low();
        pin.set_as_input();
        Self { pin }
    }
}

impl OpenDrainLine for FlexLine<'_> {
    fn release(&mut self) {
        self.pin.set_as_input();
    }

    fn drive_low(&mut self) {
        self.pin.set_low();
        self.pin.set_as_output();
    }

    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}
