//! Open-drain line abstraction
//!
//! An I2C line is shared by every device on the bus. A participant may
//! only pull it low or let go of it; the external pull-up resistor is what
//! makes it read high. Implementations must never actively source a high
//! level.

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};

/// One wire of an open-drain bus
///
/// The calls are infallible: by the time a line exists it has been
/// configured, so a hardware implementation reports problems when it is
/// constructed rather than on every edge.
pub trait OpenDrainLine {
    /// Stop driving the line and let the pull-up take it high
    fn release(&mut self);

    /// Actively pull the line to logic 0
    fn drive_low(&mut self);

    /// Sample the level currently present on the line
    ///
    /// This is the observed bus level, which may be low even after
    /// [`release`](Self::release) if another device holds the line.
    fn is_high(&mut self) -> bool;

    /// Sample the line and check for logic 0
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// Release the line for `true`, drive it low for `false`
    fn set_level(&mut self, high: bool) {
        if high {
            self.release();
        } else {
            self.drive_low();
        }
    }
}

impl<T: OpenDrainLine + ?Sized> OpenDrainLine for &mut T {
    fn release(&mut self) {
        T::release(self)
    }

    fn drive_low(&mut self) {
        T::drive_low(self)
    }

    fn is_high(&mut self) -> bool {
        T::is_high(self)
    }
}

/// Adapter for `embedded-hal` pins already configured as open-drain outputs
///
/// `set_high` on such a pin turns the output transistor off, which is
/// exactly "release". The pin must also be readable so the engine can
/// observe clock stretching and the acknowledge bit.
///
/// Only pins with an [`Infallible`] error type are accepted, which covers
/// the GPIO drivers of every mainstream HAL.
pub struct OpenDrainPin<P> {
    pin: P,
}

impl<P> OpenDrainPin<P>
where
    P: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
{
    /// Wrap an open-drain pin
    ///
    /// The line starts released.
    pub fn new(pin: P) -> Self {
        let mut line = Self { pin };
        line.release();
        line
    }

    /// Give back the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OpenDrainLine for OpenDrainPin<P>
where
    P: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
{
    fn release(&mut self) {
        match self.pin.set_high() {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }

    fn drive_low(&mut self) {
        match self.pin.set_low() {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }

    fn is_high(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high,
            Err(e) => match e {},
        }
    }
}
