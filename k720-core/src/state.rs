//! Dispenser status decoding
//!
//! Report commands answer with a short ASCII-hex string such as
//! `"0028"`. Each bit of the decoded value is an independent condition;
//! several can be set at once (a jam while the hopper is full, for
//! instance).

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Independent dispenser conditions reported by `RF`/`AP`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateFlags: u16 {
        const CARD_AT_SENSOR_1 = 0x0001;
        const CARD_AT_SENSOR_2 = 0x0002;
        const CARD_AT_SENSOR_3 = 0x0004;
        const CARD_EMPTY = 0x0008;
        const CARD_PRE_EMPTY = 0x0010;
        const CARD_JAM = 0x0020;
        const CARD_OVERLAP = 0x0040;
        const CARD_HOPPER_FULL = 0x0080;
        const RECYCLE_ERROR = 0x0100;
        const ISSUE_ERROR = 0x0200;
        const COLLECTING_CARD = 0x0400;
        const SENDING_CARD = 0x0800;
        const PREPARING_CARD = 0x1000;
        const PREPARE_CARD_FAILURE = 0x2000;
        const COMMAND_REJECTED = 0x4000;
        const RECYCLING_BOX_FULL = 0x8000;
    }
}

/// Every condition with its human-readable description, lowest bit first
pub static STATE_TABLE: [(StateFlags, &str); 16] = [
    (StateFlags::CARD_AT_SENSOR_1, "Card at sensor 1 position"),
    (StateFlags::CARD_AT_SENSOR_2, "Card at sensor 2 position"),
    (StateFlags::CARD_AT_SENSOR_3, "Card at sensor 3 position"),
    (StateFlags::CARD_EMPTY, "Card empty"),
    (StateFlags::CARD_PRE_EMPTY, "Card pre-empty"),
    (StateFlags::CARD_JAM, "Card jam"),
    (StateFlags::CARD_OVERLAP, "Card overlap"),
    (StateFlags::CARD_HOPPER_FULL, "Card hopper full"),
    (StateFlags::RECYCLE_ERROR, "Error of recycling card"),
    (StateFlags::ISSUE_ERROR, "Error of issuing card"),
    (StateFlags::COLLECTING_CARD, "Collecting card"),
    (StateFlags::SENDING_CARD, "Sending card"),
    (StateFlags::PREPARING_CARD, "Preparing card"),
    (StateFlags::PREPARE_CARD_FAILURE, "Prepare card failure"),
    (StateFlags::COMMAND_REJECTED, "Could not implement command"),
    (StateFlags::RECYCLING_BOX_FULL, "Recycling box full"),
];

/// Fold an ASCII-hex status string into a flags value
///
/// Each byte is one nibble, most significant first. `0`-`9` and
/// `A`-`F` (either case) decode to their hex value. Any other byte keeps
/// the firmware tool's `byte - '0'` arithmetic, so malformed input
/// produces the same value it always has.
///
/// # Examples
///
/// ```
/// use k720_core::decode_state;
///
/// assert_eq!(decode_state(b"0008"), 0x08);
/// assert_eq!(decode_state(b"0028"), 0x28);
/// assert_eq!(decode_state(b"00A0"), 0xA0);
/// ```
pub fn decode_state(status: &[u8]) -> u32 {
    status
        .iter()
        .fold(0u32, |acc, &b| (acc << 4) | nibble(b))
}

/// Descriptions of every condition set in `flags`, in table order
///
/// # Examples
///
/// ```
/// use k720_core::describe_state;
///
/// assert_eq!(describe_state(0x08), vec!["Card empty"]);
/// assert_eq!(describe_state(0x28), vec!["Card empty", "Card jam"]);
/// ```
pub fn describe_state(flags: u32) -> Vec<&'static str> {
    STATE_TABLE
        .iter()
        .filter(|(flag, _)| flags & u32::from(flag.bits()) != 0)
        .map(|(_, description)| *description)
        .collect()
}

fn nibble(b: u8) -> u32 {
    match b {
        b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => char::from(b).to_digit(16).unwrap_or(0),
        _ => u32::from(b.wrapping_sub(b'0')),
    }
}

impl StateFlags {
    /// Decode an ASCII-hex status string
    pub fn from_status(status: &[u8]) -> Self {
        Self::from_state(decode_state(status))
    }

    /// Keep the low 16 bits of a decoded state value
    pub fn from_state(state: u32) -> Self {
        Self::from_bits_retain((state & 0xFFFF) as u16)
    }

    /// Descriptions of the set conditions, in table order
    pub fn descriptions(self) -> Vec<&'static str> {
        describe_state(u32::from(self.bits()))
    }

    /// Card is sitting at the read/write position sensor
    pub fn card_at_reader(self) -> bool {
        self.contains(Self::CARD_AT_SENSOR_1)
    }

    /// Any jam or failure condition is present
    pub fn has_fault(self) -> bool {
        self.intersects(
            Self::CARD_JAM
                | Self::RECYCLE_ERROR
                | Self::ISSUE_ERROR
                | Self::PREPARE_CARD_FAILURE
                | Self::COMMAND_REJECTED,
        )
    }
}

impl fmt::Display for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Idle");
        }
        write!(f, "{}", self.descriptions().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_digits() {
        assert_eq!(decode_state(b"0008"), 8);
        assert_eq!(decode_state(b"0028"), 0x28);
        assert_eq!(decode_state(b"1234"), 0x1234);
        assert_eq!(decode_state(b""), 0);
    }

    #[test]
    fn test_decode_hex_letters() {
        assert_eq!(decode_state(b"80F0"), 0x80F0);
        assert_eq!(decode_state(b"00ab"), 0x00AB);
    }

    #[test]
    fn test_decode_non_hex_keeps_legacy_arithmetic() {
        // ':' is one past '9'
        assert_eq!(decode_state(b"000:"), 10);
    }

    #[test]
    fn test_describe_single() {
        assert_eq!(describe_state(8), vec!["Card empty"]);
    }

    #[test]
    fn test_describe_multiple_in_table_order() {
        assert_eq!(
            describe_state(0x00A0),
            vec!["Card jam", "Card hopper full"]
        );
        assert_eq!(describe_state(0x28), vec!["Card empty", "Card jam"]);
    }

    #[test]
    fn test_describe_nothing() {
        assert!(describe_state(0).is_empty());
    }

    #[test]
    fn test_describe_all() {
        assert_eq!(describe_state(0xFFFF).len(), 16);
        assert_eq!(describe_state(0xFFFF)[15], "Recycling box full");
    }

    #[test]
    fn test_table_covers_every_bit() {
        for (i, (flag, _)) in STATE_TABLE.iter().enumerate() {
            assert_eq!(flag.bits(), 1 << i);
        }
        assert_eq!(
            STATE_TABLE.iter().fold(StateFlags::empty(), |acc, (f, _)| acc | *f),
            StateFlags::all()
        );
    }

    #[test]
    fn test_flags_from_status() {
        let flags = StateFlags::from_status(b"0021");

        assert!(flags.card_at_reader());
        assert!(flags.has_fault());
        assert_eq!(flags.to_string(), "Card at sensor 1 position, Card jam");
    }

    #[test]
    fn test_flags_idle() {
        let flags = StateFlags::from_status(b"0000");

        assert!(!flags.card_at_reader());
        assert!(!flags.has_fault());
        assert_eq!(flags.to_string(), "Idle");
    }
}
