//! Bus construction from configuration

use embassy_rp::gpio::Pin;
use embassy_rp::Peri;
use embassy_time::Delay;
use softwire_core::{BusConfig, ConfigError, SoftI2c, Timing};

use crate::gpio::{GpioAllocator, PinSpec};
use crate::line::FlexLine;

/// Bit-banged bus on two RP2040 GPIOs
pub type Rp2040Bus<'d> = SoftI2c<FlexLine<'d>, FlexLine<'d>, Delay>;

/// Build a bus on `scl` and `sda`
///
/// The specs name the GPIOs the configuration expects and whether to
/// enable their internal pull-ups; they must match the pins handed in.
/// Both pins are claimed in `alloc`. Configuration errors are reported
/// here, never per bus operation; on error no pin stays allocated.
pub fn new_bus<'d>(
    scl: Peri<'d, impl Pin>,
    sda: Peri<'d, impl Pin>,
    scl_spec: PinSpec,
    sda_spec: PinSpec,
    timing: Timing,
    alloc: &mut GpioAllocator,
) -> Result<Rp2040Bus<'d>, ConfigError> {
    let config = claim_pins(scl.pin(), sda.pin(), scl_spec, sda_spec, timing, alloc)?;

    let scl = FlexLine::new(scl, scl_spec.pull_up);
    let sda = FlexLine::new(sda, sda_spec.pull_up);
    Ok(SoftI2c::new(scl, sda, Delay, config.timing))
}

/// Check the configured pins against the real ones and claim them
fn claim_pins(
    scl_pin: u8,
    sda_pin: u8,
    scl_spec: PinSpec,
    sda_spec: PinSpec,
    timing: Timing,
    alloc: &mut GpioAllocator,
) -> Result<BusConfig, ConfigError> {
    for (spec, actual) in [(scl_spec, scl_pin), (sda_spec, sda_pin)] {
        if spec.pin != actual {
            return Err(ConfigError::PinMismatch {
                configured: spec.pin,
                actual,
            });
        }
    }

    let config = BusConfig::new(scl_pin, sda_pin).with_timing(timing);
    config.validate()?;

    alloc.allocate(config.scl)?;
    if let Err(e) = alloc.allocate(config.sda) {
        alloc.release(config.scl);
        return Err(e);
    }
    Ok(config)
}
