//! Protocol constants

use std::time::Duration;

/// Start of text, opens every data frame
pub const STX: u8 = 0x02;

/// End of text, closes the payload region
pub const ETX: u8 = 0x03;

/// Enquiry, polls the device for its response
pub const ENQ: u8 = 0x05;

/// Positive acknowledgement
pub const ACK: u8 = 0x06;

/// Negative acknowledgement
pub const NAK: u8 = 0x15;

/// Default line speed
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Factory address of the dispenser
pub const DEFAULT_ADDRESS: u8 = 15;

/// Highest valid device address
pub const MAX_ADDRESS: u8 = 15;

/// Leading byte of a successful card operation reply
pub const REPLY_SUCCESS: u8 = b'P';

/// Leading byte of a failed card operation reply
pub const REPLY_FAILURE: u8 = b'N';

/// Card technology opcodes
pub mod opcodes {
    /// Mifare S50 (1K)
    pub const S50: u8 = 0x3b;

    /// Mifare S70 (4K)
    pub const S70: u8 = 0x3c;

    /// Mifare Ultralight
    pub const ULTRALIGHT: u8 = 0x3d;

    /// Detect card in the RF field
    pub const DETECT: u8 = 0x30;

    /// Read card serial number
    pub const GET_ID: u8 = 0x31;

    /// Verify a sector key (S50 only)
    pub const LOAD_KEY: u8 = 0x32;
}

/// Sector key selectors
pub mod keys {
    pub const KEY_A: u8 = 0x30;
    pub const KEY_B: u8 = 0x31;
}
