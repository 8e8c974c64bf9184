//! Bus configuration
//!
//! Configuration is fixed when the bus is built; nothing here changes per
//! transfer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bit-level timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// Hold time after each line change, in nanoseconds
    ///
    /// Every bit is two holds long (data setup, clock high), so the SCL
    /// frequency is roughly `1 / (2 * bit_delay)`.
    pub bit_delay_ns: u32,
    /// How many extra times a line is sampled while waiting for it to be
    /// released before giving up with `Error::BusStuck`
    ///
    /// `u32::MAX` effectively waits forever.
    pub max_wait_polls: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            bit_delay_ns: Self::DEFAULT_BIT_DELAY_NS,
            max_wait_polls: u32::MAX,
        }
    }
}

impl Timing {
    /// 4 µs per hold, comfortably inside standard-mode margins
    pub const DEFAULT_BIT_DELAY_NS: u32 = 4_000;

    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self::from_frequency(100_000);

    /// Fast mode (400 kHz)
    ///
    /// The achieved rate is lower: line switching and sampling add to
    /// every hold.
    pub const FAST: Self = Self::from_frequency(400_000);

    /// Timing for a target SCL frequency in Hz
    ///
    /// A frequency of zero falls back to the default bit period.
    pub const fn from_frequency(hz: u32) -> Self {
        let bit_delay_ns = if hz == 0 {
            Self::DEFAULT_BIT_DELAY_NS
        } else {
            500_000_000 / hz
        };
        Self {
            bit_delay_ns,
            max_wait_polls: u32::MAX,
        }
    }

    /// Same timing with a bounded wait for released lines
    pub const fn with_max_wait_polls(self, max_wait_polls: u32) -> Self {
        Self {
            bit_delay_ns: self.bit_delay_ns,
            max_wait_polls,
        }
    }
}

/// Board-level bus configuration: which GPIOs carry SCL and SDA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// GPIO number of the clock line
    pub scl: u8,
    /// GPIO number of the data line
    pub sda: u8,
    /// Bit-level timing
    #[cfg_attr(feature = "serde", serde(default))]
    pub timing: Timing,
}

impl BusConfig {
    /// Create a config with default timing
    pub const fn new(scl: u8, sda: u8) -> Self {
        Self {
            scl,
            sda,
            timing: Timing {
                bit_delay_ns: Timing::DEFAULT_BIT_DELAY_NS,
                max_wait_polls: u32::MAX,
            },
        }
    }

    /// Replace the timing
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Check the configuration for mistakes that do not depend on the chip
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scl == self.sda {
            return Err(ConfigError::SameLine(self.scl));
        }
        if self.timing.bit_delay_ns == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let timing = Timing::default();
        assert_eq!(timing.bit_delay_ns, 4_000);
        assert_eq!(timing.max_wait_polls, u32::MAX);
    }

    #[test]
    fn test_timing_from_frequency() {
        assert_eq!(Timing::STANDARD.bit_delay_ns, 5_000);
        assert_eq!(Timing::FAST.bit_delay_ns, 1_250);
        assert_eq!(Timing::from_frequency(0), Timing::default());
    }

    #[test]
    fn test_bounded_wait() {
        let timing = Timing::default().with_max_wait_polls(10);
        assert_eq!(timing.max_wait_polls, 10);
        assert_eq!(timing.bit_delay_ns, Timing::DEFAULT_BIT_DELAY_NS);
    }

    #[test]
    fn test_validate_distinct_lines() {
        assert_eq!(BusConfig::new(3, 4).validate(), Ok(()));
        assert_eq!(
            BusConfig::new(4, 4).validate(),
            Err(ConfigError::SameLine(4))
        );
    }

    #[test]
    fn test_validate_zero_bit_delay() {
        let config = BusConfig::new(3, 4).with_timing(Timing {
            bit_delay_ns: 0,
            max_wait_polls: 1,
        });
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }
}
