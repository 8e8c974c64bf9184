//! Embassy async tasks
//!
//! Tasks share the bus through [`SharedBus`] and hold the lock for one
//! transaction at a time.

pub mod eeprom;
pub mod scan;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use softwire_hal_rp2040::Rp2040Bus;

pub use eeprom::eeprom_task;
pub use scan::scan_task;

/// The bus, shareable between tasks
pub type SharedBus = Mutex<CriticalSectionRawMutex, Rp2040Bus<'static>>;
