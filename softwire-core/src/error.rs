//! Error types
//!
//! Transaction errors are local to one call. The engine never retries;
//! when a transaction fails it has already put a STOP on the bus, so the
//! next call starts from an idle bus.

use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Error from a bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The slave did not acknowledge its address byte
    ///
    /// No data bytes were transferred.
    NoAckAddress,
    /// The slave did not acknowledge a data byte
    NoAckData {
        /// Bytes acknowledged before the rejected one
        written: usize,
    },
    /// A line stayed low for longer than the configured wait bound
    ///
    /// Raised while waiting for an idle bus around START/STOP, or for the
    /// clock to be released during the acknowledge bit.
    BusStuck,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoAckAddress => write!(f, "address not acknowledged"),
            Error::NoAckData { written } => {
                write!(f, "data not acknowledged after {} byte(s)", written)
            }
            Error::BusStuck => write!(f, "bus line held low"),
        }
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::NoAckAddress => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::NoAckData { .. } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::BusStuck => ErrorKind::Bus,
        }
    }
}

/// Error from bus configuration
///
/// Raised once, when a bus is built, never by an individual transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Clock and data were assigned the same GPIO
    SameLine(u8),
    /// GPIO number does not exist on this chip
    InvalidPin(u8),
    /// GPIO is already in use by something else
    PinInUse(u8),
    /// Pin name could not be parsed
    InvalidPinName,
    /// Configured GPIO differs from the pin actually handed in
    PinMismatch {
        /// GPIO number named by the configuration
        configured: u8,
        /// GPIO number of the pin passed to the constructor
        actual: u8,
    },
    /// Bit period of zero
    InvalidTiming,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SameLine(pin) => write!(f, "gpio{} used for both SCL and SDA", pin),
            ConfigError::InvalidPin(pin) => write!(f, "gpio{} does not exist", pin),
            ConfigError::PinInUse(pin) => write!(f, "gpio{} already allocated", pin),
            ConfigError::InvalidPinName => write!(f, "invalid pin name"),
            ConfigError::PinMismatch { configured, actual } => {
                write!(f, "config names gpio{} but gpio{} was passed", configured, actual)
            }
            ConfigError::InvalidTiming => write!(f, "bit period must be non-zero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            Error::NoAckAddress.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            Error::NoAckData { written: 2 }.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
        assert_eq!(Error::BusStuck.kind(), ErrorKind::Bus);
    }

    #[test]
    fn test_pin_mismatch_display() {
        use core::fmt::Write;

        let mut text: heapless::String<64> = heapless::String::new();
        let e = ConfigError::PinMismatch { configured: 4, actual: 5 };
        write!(text, "{}", e).unwrap();
        assert_eq!(text.as_str(), "config names gpio4 but gpio5 was passed");
    }
}
