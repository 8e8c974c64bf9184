//! Bus scan task
//!
//! Probes every non-reserved 7-bit address and logs the ones that answer.

use defmt::*;
use embassy_time::{Duration, Timer};
use softwire_hal::i2c::{is_reserved_address, MAX_ADDRESS};

use super::SharedBus;

/// Time between scans
pub const SCAN_INTERVAL_SECS: u64 = 10;

#[embassy_executor::task]
pub async fn scan_task(bus: &'static SharedBus) {
    info!("Scan task started");

    loop {
        let mut found = 0u8;
        for address in (0..=MAX_ADDRESS).filter(|a| !is_reserved_address(*a)) {
            // One lock per probe so the EEPROM task can interleave
            let result = bus.lock().await.probe(address);
            match result {
                Ok(true) => {
                    info!("Device at {=u8:#x}", address);
                    found += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Scan aborted at {=u8:#x}: {}", address, e);
                    break;
                }
            }
        }
        info!("Scan complete, {} device(s)", found);

        Timer::after(Duration::from_secs(SCAN_INTERVAL_SECS)).await;
    }
}
