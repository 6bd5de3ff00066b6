//! Device addressing

use std::fmt;

use crate::{
    constants::MAX_ADDRESS,
    error::{Error, Result},
};

/// Address of one dispenser on the serial line
///
/// Always in `0..=15`. On the wire it travels as two ASCII decimal
/// digits, zero padded.
///
/// # Examples
///
/// ```
/// use k720_core::Address;
///
/// let addr = Address::new(5).unwrap();
/// assert_eq!(&addr.to_ascii(), b"05");
/// assert!(Address::new(16).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(u8);

impl Address {
    /// Validate and wrap a raw address
    pub fn new(raw: u8) -> Result<Self> {
        if raw > MAX_ADDRESS {
            return Err(Error::InvalidAddress(raw));
        }
        Ok(Self(raw))
    }

    /// Raw numeric value
    pub fn value(self) -> u8 {
        self.0
    }

    /// Two-digit ASCII encoding used in frames and acknowledgements
    pub fn to_ascii(self) -> [u8; 2] {
        [b'0' + self.0 / 10, b'0' + self.0 % 10]
    }
}

impl TryFrom<u8> for Address {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Address> for u8 {
    fn from(addr: Address) -> u8 {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_bounds() {
        assert!(Address::new(0).is_ok());
        assert!(Address::new(15).is_ok());
        assert!(matches!(Address::new(16), Err(Error::InvalidAddress(16))));
        assert!(matches!(Address::new(255), Err(Error::InvalidAddress(255))));
    }

    #[test]
    fn test_address_ascii() {
        assert_eq!(&Address::new(0).unwrap().to_ascii(), b"00");
        assert_eq!(&Address::new(9).unwrap().to_ascii(), b"09");
        assert_eq!(&Address::new(15).unwrap().to_ascii(), b"15");
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address::new(7).unwrap().to_string(), "07");
    }
}
