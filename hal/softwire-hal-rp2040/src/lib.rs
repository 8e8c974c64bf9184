//! RP2040 support for the softwire I2C master
//!
//! - GPIO allocation and pin-string parsing for config-driven setup
//! - [`FlexLine`], an open-drain line on top of `embassy_rp::gpio::Flex`
//! - [`new_bus`], which checks the pin assignment and builds a
//!   [`SoftI2c`](softwire_core::SoftI2c) on two GPIOs

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod gpio;
pub mod line;

pub use bus::{new_bus, Rp2040Bus};
pub use gpio::{parse_pin_string, GpioAllocator, PinSpec};
pub use line::FlexLine;
