//! Bus settings compiled in from softwire.toml
//!
//! build.rs validates the file and generates the constants and the
//! `bus_pins!` macro included below.

use softwire_core::{ConfigError, Timing};
use softwire_hal_rp2040::{parse_pin_string, PinSpec};

include!(concat!(env!("OUT_DIR"), "/bus_config.rs"));

pub fn timing() -> Timing {
    Timing {
        bit_delay_ns: BIT_DELAY_NS,
        max_wait_polls: MAX_WAIT_POLLS,
    }
}

/// Parsed (SCL, SDA) pin strings
pub fn pin_specs() -> Result<(PinSpec, PinSpec), ConfigError> {
    Ok((parse_pin_string(SCL)?, parse_pin_string(SDA)?))
}
