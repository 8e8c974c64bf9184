//! Bit-banged I2C master
//!
//! This crate drives an I2C bus from two ordinary GPIO lines. It is
//! board-agnostic: lines come in through [`softwire_hal::OpenDrainLine`]
//! and timing through [`embedded_hal::delay::DelayNs`].
//!
//! The engine is layered bottom-up:
//!
//! - Condition generator: [`SoftI2c::start`], [`SoftI2c::stop`]
//! - Byte transceiver: [`SoftI2c::send_byte`], [`SoftI2c::receive_byte`]
//! - Transaction sequencer: [`SoftI2c::write`], [`SoftI2c::read`],
//!   [`SoftI2c::write_read`], [`SoftI2c::probe`], plus the
//!   `embedded-hal` [`I2c`](embedded_hal::i2c::I2c) implementation
//! - Receive buffer façade: [`wire::RxBuffer`], [`wire::Wire`]
//!
//! [`sim`] contains an open-drain bus model with a simulated slave, used
//! by the tests and usable for host-side development.
//!
//! ```
//! use softwire_core::sim::{SimBus, SimSlave};
//! use softwire_core::{SoftI2c, Timing};
//!
//! let sim = SimBus::new(SimSlave::new(0x50));
//! let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());
//!
//! i2c.write(0x50, &[0x00, 0x42]).unwrap();
//! let mut buf = [0u8; 1];
//! i2c.write_read(0x50, &[0x00], &mut buf).unwrap();
//! assert_eq!(buf, [0x42]);
//! ```

#![no_std]
#![deny(unsafe_code)]

// This must go first so the macros are visible to the other modules
mod fmt;

pub mod bus;
pub mod config;
pub mod error;
pub mod sim;
pub mod wire;

pub use bus::SoftI2c;
pub use config::{BusConfig, Timing};
pub use error::{ConfigError, Error};
pub use wire::{RxBuffer, Wire};
