//! EEPROM round-trip task
//!
//! Writes a changing pattern to a 24Cxx register block, waits out the
//! internal write cycle, then reads it back twice: once with a combined
//! write/read and once through the `Wire`-style receive buffer.

use defmt::*;
use embassy_time::{Duration, Timer};
use softwire_core::{Error, RxBuffer};

use super::SharedBus;

/// Bytes written per round trip; stays inside one 8-byte 24C02 page
pub const PATTERN_LEN: usize = 4;

/// Time between round trips
pub const ROUND_TRIP_INTERVAL_SECS: u64 = 5;

/// Write-cycle polls before giving up (the datasheet maximum is 5 ms)
const WRITE_CYCLE_POLLS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
enum RoundTripError {
    Bus(Error),
    /// Device still busy after the write cycle timeout
    WriteTimeout,
    Mismatch { index: usize, expected: u8, found: u8 },
    /// The receive buffer came back short
    ShortRead(u8),
}

impl From<Error> for RoundTripError {
    fn from(e: Error) -> Self {
        Self::Bus(e)
    }
}

#[embassy_executor::task]
pub async fn eeprom_task(bus: &'static SharedBus, address: u8, register: u8) {
    info!(
        "EEPROM task started (device {=u8:#x}, register {=u8:#x})",
        address, register
    );

    let mut rx: RxBuffer = RxBuffer::new();
    let mut seed = 0u8;

    loop {
        let pattern = [seed, !seed, seed.wrapping_add(1), seed ^ 0x5A];
        match round_trip(bus, address, register, &pattern, &mut rx).await {
            Ok(()) => info!("Register {=u8:#x} verified: {:#x}", register, pattern),
            Err(e) => warn!("EEPROM round trip failed: {}", e),
        }
        seed = seed.wrapping_add(0x11);

        Timer::after(Duration::from_secs(ROUND_TRIP_INTERVAL_SECS)).await;
    }
}

async fn round_trip(
    bus: &SharedBus,
    address: u8,
    register: u8,
    pattern: &[u8; PATTERN_LEN],
    rx: &mut RxBuffer,
) -> Result<(), RoundTripError> {
    let mut frame = [0u8; PATTERN_LEN + 1];
    frame[0] = register;
    frame[1..].copy_from_slice(pattern);
    bus.lock().await.write(address, &frame)?;

    wait_write_cycle(bus, address).await?;

    // Combined format: register pointer, repeated START, read
    let mut readback = [0u8; PATTERN_LEN];
    bus.lock()
        .await
        .write_read(address, &[register], &mut readback)?;
    compare(pattern, readback.iter().copied())?;

    // Pointer write, then a buffered read under the same lock
    let stored = {
        let mut guard = bus.lock().await;
        guard.write(address, &[register])?;
        rx.request(&mut *guard, address, PATTERN_LEN as u8, true)
    };
    if usize::from(stored) != PATTERN_LEN {
        return Err(RoundTripError::ShortRead(stored));
    }
    compare(pattern, core::iter::from_fn(|| rx.read_next()))
}

/// Acknowledge polling: the device ignores its address until the write is done
async fn wait_write_cycle(bus: &SharedBus, address: u8) -> Result<(), RoundTripError> {
    for _ in 0..WRITE_CYCLE_POLLS {
        if bus.lock().await.probe(address)? {
            return Ok(());
        }
        Timer::after_millis(1).await;
    }
    Err(RoundTripError::WriteTimeout)
}

fn compare(expected: &[u8], found: impl Iterator<Item = u8>) -> Result<(), RoundTripError> {
    for (index, (&expected, found)) in expected.iter().zip(found).enumerate() {
        if expected != found {
            return Err(RoundTripError::Mismatch {
                index,
                expected,
                found,
            });
        }
    }
    Ok(())
}
