//! SoftWire demo firmware
//!
//! Runs a bit-banged I2C bus on two RP2040 GPIOs (see softwire.toml) and
//! exercises it from two tasks sharing the bus through a mutex:
//!
//! - a periodic scan that logs every address that answers
//! - a write/read-back check against a 24Cxx EEPROM

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use softwire_hal_rp2040::{new_bus, GpioAllocator};

use crate::tasks::SharedBus;

#[macro_use]
mod config;
mod tasks;

static BUS: StaticCell<SharedBus> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SoftWire firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let timing = config::timing();
    info!(
        "Bus config: scl={=str}, sda={=str}, bit delay {} ns, wait bound {} polls",
        config::SCL,
        config::SDA,
        timing.bit_delay_ns,
        timing.max_wait_polls
    );

    let mut alloc = GpioAllocator::new();
    let (scl, sda) = bus_pins!(p);
    let bus = match config::pin_specs()
        .and_then(|(scl_spec, sda_spec)| new_bus(scl, sda, scl_spec, sda_spec, timing, &mut alloc))
    {
        Ok(bus) => bus,
        Err(e) => {
            error!("Bus setup failed: {}", e);
            loop {
                Timer::after_secs(60).await;
            }
        }
    };
    let bus: &'static SharedBus = BUS.init(Mutex::new(bus));
    info!("Bus ready");

    spawner.spawn(tasks::scan_task(bus)).unwrap();
    spawner
        .spawn(tasks::eeprom_task(bus, config::EEPROM_ADDRESS, config::EEPROM_REGISTER))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
