//! Contactless card types handled by the dispenser's reader module

use std::fmt;

use bytes::Bytes;
use k720_core::{
    Command,
    constants::{REPLY_FAILURE, REPLY_SUCCESS, keys},
};

use crate::error::{Error, Result};

/// Card technologies the reader module speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardTechnology {
    /// Mifare Classic 1K
    S50,

    /// Mifare Classic 4K
    S70,

    /// Mifare Ultralight
    Ultralight,
}

impl CardTechnology {
    /// Command that checks for a card of this type in the RF field
    pub fn detect_command(self) -> Command {
        match self {
            Self::S50 => Command::S50Detect,
            Self::S70 => Command::S70Detect,
            Self::Ultralight => Command::UltralightDetect,
        }
    }

    /// Command that reads the card serial number
    pub fn get_id_command(self) -> Command {
        match self {
            Self::S50 => Command::S50GetId,
            Self::S70 => Command::S70GetId,
            Self::Ultralight => Command::UltralightGetId,
        }
    }

    /// Only S50 cards accept sector key verification
    pub fn supports_key_loading(self) -> bool {
        matches!(self, Self::S50)
    }
}

impl fmt::Display for CardTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::S50 => "S50",
            Self::S70 => "S70",
            Self::Ultralight => "UL",
        };
        write!(f, "{}", name)
    }
}

/// Which Mifare sector key to verify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyType {
    A = keys::KEY_A,
    B = keys::KEY_B,
}

impl KeyType {
    /// Selector byte sent on the wire
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for KeyType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            keys::KEY_A => Ok(Self::A),
            keys::KEY_B => Ok(Self::B),
            _ => Err(Error::UnknownKeyType(value)),
        }
    }
}

/// Reply to a card operation
///
/// The reader module prefixes card replies with a status byte: `'P'`
/// on success, `'N'` on failure. Serial number replies carry three
/// prefix bytes before the ID itself.
///
/// # Examples
///
/// ```
/// use k720_types::CardReply;
///
/// let reply = CardReply::parse(&b"P\x00\x04\xDE\xAD\xBE\xEF"[..]).unwrap();
/// assert!(reply.is_success());
/// assert_eq!(reply.card_id().unwrap().as_ref(), &[0xDE, 0xAD, 0xBE, 0xEF]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReply {
    payload: Bytes,
}

impl CardReply {
    /// Bytes preceding the serial number in an ID reply
    pub const ID_PREFIX_LEN: usize = 3;

    /// Wrap a card operation payload
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] if the payload is empty.
    pub fn parse(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(Error::Parse("empty card reply".into()));
        }
        Ok(Self { payload })
    }

    /// Leading status byte
    pub fn status(&self) -> u8 {
        self.payload[0]
    }

    /// Reader reported success
    pub fn is_success(&self) -> bool {
        self.status() == REPLY_SUCCESS
    }

    /// Reader reported failure
    pub fn is_failure(&self) -> bool {
        self.status() == REPLY_FAILURE
    }

    /// Serial number, for a successful ID reply
    pub fn card_id(&self) -> Option<Bytes> {
        if !self.is_success() || self.payload.len() <= Self::ID_PREFIX_LEN {
            return None;
        }
        Some(self.payload.slice(Self::ID_PREFIX_LEN..))
    }

    /// Serial number as upper-case hex
    pub fn card_id_hex(&self) -> Option<String> {
        self.card_id().map(hex::encode_upper)
    }

    /// Raw payload
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

impl fmt::Display for CardReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.payload))
    }
}
