//! K720 block check character (BCC)
//!
//! The BCC is a single byte: the XOR of every frame byte from STX
//! through ETX inclusive.

use tracing::trace;

/// Calculate the BCC of a byte sequence
///
/// # Algorithm
///
/// ```text
/// bcc = 0x00
/// for b in bytes: bcc ^= b
/// ```
///
/// # Examples
///
/// ```
/// use k720_core::checksum;
///
/// // STX "15" 0x00 0x02 "GV" ETX
/// let frame = [0x02, b'1', b'5', 0x00, 0x02, b'G', b'V', 0x03];
/// let bcc = checksum::calculate(&frame);
/// assert_eq!(bcc, 0x02 ^ b'1' ^ b'5' ^ 0x02 ^ b'G' ^ b'V' ^ 0x03);
/// ```
pub fn calculate(bytes: &[u8]) -> u8 {
    let bcc = bytes.iter().fold(0u8, |acc, b| acc ^ b);

    trace!(
        len = bytes.len(),
        bcc = format!("0x{:02X}", bcc),
        "Calculated BCC"
    );

    bcc
}
