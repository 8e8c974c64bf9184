//! SoftWire Hardware Abstraction Layer
//!
//! This crate defines the traits the bit-banged I2C engine is written
//! against. Chip-specific HALs (RP2040, or anything exposing
//! `embedded-hal` pins) implement them, so the same protocol engine runs
//! on different hardware and on the host-side simulator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (softwire-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softwire-core (protocol engine)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softwire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ softwire-hal- │       │ embedded-hal  │
//! │    rp2040     │       │  pin adapter  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OpenDrainLine`] - One wire of the bus (SCL or SDA)
//! - [`i2c::I2cBus`] - I2C master operations

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use gpio::{OpenDrainLine, OpenDrainPin};
pub use i2c::I2cBus;
