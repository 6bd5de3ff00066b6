//! K720 command definitions

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::opcodes;

/// Dispenser command vocabulary
///
/// Every variant maps to the exact payload bytes placed in a command
/// frame; see [`Command::payload`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // Device information
    GetVersion,
    Query,
    SensorQuery,

    // Card movement
    Reset,
    /// `FC0`..`FC8`
    MoveTo(u8),
    Dispense,
    Recycle,

    // Mifare S50
    S50Detect,
    S50GetId,
    S50LoadKey {
        sector: u8,
        key_type: u8,
        key: Bytes,
    },

    // Mifare S70
    S70Detect,
    S70GetId,

    // Mifare Ultralight
    UltralightDetect,
    UltralightGetId,

    /// Anything not covered above, sent verbatim
    Raw(Bytes),
}

impl Command {
    /// Payload bytes for this command
    ///
    /// # Examples
    ///
    /// ```
    /// use k720_core::Command;
    ///
    /// assert_eq!(Command::GetVersion.payload().as_ref(), b"GV");
    /// assert_eq!(Command::MoveTo(7).payload().as_ref(), b"FC7");
    /// assert_eq!(Command::S70GetId.payload().as_ref(), &[0x3c, 0x31]);
    /// ```
    pub fn payload(&self) -> Bytes {
        match self {
            Self::GetVersion => Bytes::from_static(b"GV"),
            Self::Query => Bytes::from_static(b"RF"),
            Self::SensorQuery => Bytes::from_static(b"AP"),
            Self::Reset => Bytes::from_static(b"RS"),
            Self::MoveTo(position) => {
                let mut buf = BytesMut::with_capacity(3);
                buf.put_slice(b"FC");
                buf.put_u8(b'0'.wrapping_add(*position));
                buf.freeze()
            }
            Self::Dispense => Bytes::from_static(b"DC"),
            Self::Recycle => Bytes::from_static(b"CP"),
            Self::S50Detect => Bytes::from_static(&[opcodes::S50, opcodes::DETECT]),
            Self::S50GetId => Bytes::from_static(&[opcodes::S50, opcodes::GET_ID]),
            Self::S50LoadKey {
                sector,
                key_type,
                key,
            } => {
                let mut buf = BytesMut::with_capacity(4 + key.len());
                buf.put_u8(opcodes::S50);
                buf.put_u8(opcodes::LOAD_KEY);
                buf.put_u8(*sector);
                buf.put_u8(*key_type);
                buf.put_slice(key);
                buf.freeze()
            }
            Self::S70Detect => Bytes::from_static(&[opcodes::S70, opcodes::DETECT]),
            Self::S70GetId => Bytes::from_static(&[opcodes::S70, opcodes::GET_ID]),
            Self::UltralightDetect => {
                Bytes::from_static(&[opcodes::ULTRALIGHT, opcodes::DETECT])
            }
            Self::UltralightGetId => Bytes::from_static(&[opcodes::ULTRALIGHT, opcodes::GET_ID]),
            Self::Raw(payload) => payload.clone(),
        }
    }

    /// Get command name
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetVersion => "GET_VERSION",
            Self::Query => "QUERY",
            Self::SensorQuery => "SENSOR_QUERY",
            Self::Reset => "RESET",
            Self::MoveTo(_) => "MOVE_TO",
            Self::Dispense => "DISPENSE",
            Self::Recycle => "RECYCLE",
            Self::S50Detect => "S50_DETECT",
            Self::S50GetId => "S50_GET_ID",
            Self::S50LoadKey { .. } => "S50_LOAD_KEY",
            Self::S70Detect => "S70_DETECT",
            Self::S70GetId => "S70_GET_ID",
            Self::UltralightDetect => "UL_DETECT",
            Self::UltralightGetId => "UL_GET_ID",
            Self::Raw(_) => "RAW",
        }
    }
}

impl From<&[u8]> for Command {
    fn from(payload: &[u8]) -> Self {
        Self::Raw(Bytes::copy_from_slice(payload))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), hex::encode_upper(self.payload()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_commands() {
        assert_eq!(Command::GetVersion.payload().as_ref(), b"GV");
        assert_eq!(Command::Query.payload().as_ref(), b"RF");
        assert_eq!(Command::SensorQuery.payload().as_ref(), b"AP");
        assert_eq!(Command::Reset.payload().as_ref(), b"RS");
        assert_eq!(Command::Dispense.payload().as_ref(), b"DC");
        assert_eq!(Command::Recycle.payload().as_ref(), b"CP");
    }

    #[test]
    fn test_move_to() {
        assert_eq!(Command::MoveTo(0).payload().as_ref(), b"FC0");
        assert_eq!(Command::MoveTo(8).payload().as_ref(), b"FC8");
    }

    #[test]
    fn test_card_opcodes() {
        assert_eq!(Command::S50Detect.payload().as_ref(), &[0x3b, 0x30]);
        assert_eq!(Command::S50GetId.payload().as_ref(), &[0x3b, 0x31]);
        assert_eq!(Command::S70Detect.payload().as_ref(), &[0x3c, 0x30]);
        assert_eq!(Command::UltralightGetId.payload().as_ref(), &[0x3d, 0x31]);
    }

    #[test]
    fn test_load_key_payload() {
        let cmd = Command::S50LoadKey {
            sector: 0x01,
            key_type: 0x30,
            key: Bytes::from_static(&[0xFF; 6]),
        };

        assert_eq!(
            cmd.payload().as_ref(),
            &[0x3b, 0x32, 0x01, 0x30, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(cmd.name(), "S50_LOAD_KEY");
    }

    #[test]
    fn test_raw_command() {
        let cmd = Command::from(&b"FC4"[..]);
        assert_eq!(cmd.payload().as_ref(), b"FC4");
        assert_eq!(cmd.to_string(), "RAW(464334)");
    }
}
