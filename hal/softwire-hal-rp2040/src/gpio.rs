//! GPIO allocation and pin-string parsing
//!
//! Tracks which GPIO pins are in use so two buses (or a bus and some other
//! driver) never share a line.

use heapless::FnvIndexSet;
use softwire_core::ConfigError;

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// GPIO allocator to track pin usage
pub struct GpioAllocator {
    allocated: FnvIndexSet<u8, 32>,
}

impl Default for GpioAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioAllocator {
    /// Create a new GPIO allocator
    pub fn new() -> Self {
        Self {
            allocated: FnvIndexSet::new(),
        }
    }

    /// Mark a pin as in use
    pub fn allocate(&mut self, pin: u8) -> Result<(), ConfigError> {
        if pin >= GPIO_COUNT {
            return Err(ConfigError::InvalidPin(pin));
        }
        if self.allocated.contains(&pin) {
            return Err(ConfigError::PinInUse(pin));
        }
        self.allocated
            .insert(pin)
            .map_err(|_| ConfigError::PinInUse(pin))?;
        Ok(())
    }

    /// Release a GPIO pin
    pub fn release(&mut self, pin: u8) {
        self.allocated.remove(&pin);
    }

    /// Check if a pin is allocated
    pub fn is_allocated(&self, pin: u8) -> bool {
        self.allocated.contains(&pin)
    }

    /// Get the number of allocated pins
    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }
}

/// A parsed pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSpec {
    pub pin: u8,
    /// Enable the internal pull-up
    pub pull_up: bool,
}

/// Parse a pin string from config
///
/// - `"gpio11"` is GPIO 11
/// - `"^gpio4"` is GPIO 4 with the internal pull-up enabled
///
/// Inverted pins (`"!gpio12"`) make no sense on an open-drain bus and are
/// rejected.
pub fn parse_pin_string(s: &str) -> Result<PinSpec, ConfigError> {
    let s = s.trim();

    let (s, pull_up) = match s.strip_prefix('^') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let pin: u8 = s
        .strip_prefix("gpio")
        .and_then(|n| n.parse().ok())
        .ok_or(ConfigError::InvalidPinName)?;

    if pin >= GPIO_COUNT {
        return Err(ConfigError::InvalidPin(pin));
    }

    Ok(PinSpec { pin, pull_up })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator() {
        let mut alloc = GpioAllocator::new();

        assert!(alloc.allocate(4).is_ok());
        assert!(alloc.is_allocated(4));

        // Can't allocate same pin twice
        assert_eq!(alloc.allocate(4), Err(ConfigError::PinInUse(4)));

        assert!(alloc.allocate(5).is_ok());
        assert_eq!(alloc.allocated_count(), 2);

        alloc.release(4);
        assert!(!alloc.is_allocated(4));
        assert!(alloc.allocate(4).is_ok());

        assert_eq!(alloc.allocate(30), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(parse_pin_string("gpio5"), Ok(PinSpec { pin: 5, pull_up: false }));
        assert_eq!(parse_pin_string(" ^gpio4 "), Ok(PinSpec { pin: 4, pull_up: true }));
        assert_eq!(parse_pin_string("gpio0").map(|p| p.pin), Ok(0));
        assert_eq!(parse_pin_string("gpio29").map(|p| p.pin), Ok(29));

        assert_eq!(parse_pin_string("gpio30"), Err(ConfigError::InvalidPin(30)));
        assert_eq!(parse_pin_string("!gpio12"), Err(ConfigError::InvalidPinName));
        assert_eq!(parse_pin_string("pin11"), Err(ConfigError::InvalidPinName));
        assert_eq!(parse_pin_string("gpio"), Err(ConfigError::InvalidPinName));
        assert_eq!(parse_pin_string(""), Err(ConfigError::InvalidPinName));
    }
}
