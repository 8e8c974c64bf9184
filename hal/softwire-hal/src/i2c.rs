//! I2C bus abstractions
//!
//! Provides the master-side I2C interface and the 7-bit address framing
//! shared by every implementation.

/// Transfer direction encoded in the least significant bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master writes to the slave (R/W bit = 0)
    Write,
    /// Master reads from the slave (R/W bit = 1)
    Read,
}

/// Highest valid 7-bit address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Build the first byte of a transfer: `address << 1 | R/W`
///
/// Bits above the 7-bit address are discarded.
pub const fn address_byte(address: u8, direction: Direction) -> u8 {
    let rw = match direction {
        Direction::Write => 0,
        Direction::Read => 1,
    };
    ((address & MAX_ADDRESS) << 1) | rw
}

/// Check whether an address falls in one of the reserved ranges
///
/// `0x00..=0x07` and `0x78..=0x7F` are reserved by the I2C specification
/// (general call, CBUS, high-speed master codes, 10-bit prefixes). Bus
/// scanners should skip them.
pub const fn is_reserved_address(address: u8) -> bool {
    address < 0x08 || address > 0x77
}

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_byte_framing() {
        assert_eq!(address_byte(0x50, Direction::Write), 0xA0);
        assert_eq!(address_byte(0x50, Direction::Read), 0xA1);
        assert_eq!(address_byte(0x00, Direction::Read), 0x01);
        assert_eq!(address_byte(0x7F, Direction::Write), 0xFE);
    }

    #[test]
    fn test_address_byte_masks_eighth_bit() {
        assert_eq!(address_byte(0xD0, Direction::Write), 0xA0);
    }

    #[test]
    fn test_reserved_addresses() {
        assert!(is_reserved_address(0x00));
        assert!(is_reserved_address(0x07));
        assert!(!is_reserved_address(0x08));
        assert!(!is_reserved_address(0x77));
        assert!(is_reserved_address(0x78));
    }
}
