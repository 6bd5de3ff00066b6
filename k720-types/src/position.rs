//! Card transport positions (`FC0`..`FC8`)

use std::fmt;

use k720_core::Command;

use crate::error::{Error, Result};

/// Where the dispenser should move the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Eject fully out of the bezel (`FC0`)
    Outside,

    /// Hold at the bezel so the user can take it (`FC4`)
    TakeCard,

    /// Park at sensor 2 (`FC6`)
    Sensor2,

    /// Park in the RF read/write position (`FC7`)
    CardRead,

    /// Accept a card inserted from the front (`FC8`)
    FrontEnter,

    /// `FC1`, `FC2`, `FC3` or `FC5`
    Other(u8),
}

impl Position {
    /// Highest valid position code
    pub const MAX_CODE: u8 = 8;

    /// Map an `FCn` digit to a position
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Outside),
            4 => Ok(Self::TakeCard),
            6 => Ok(Self::Sensor2),
            7 => Ok(Self::CardRead),
            8 => Ok(Self::FrontEnter),
            1..=3 | 5 => Ok(Self::Other(code)),
            _ => Err(Error::InvalidPosition(code)),
        }
    }

    /// The `n` in `FCn`
    pub fn code(self) -> u8 {
        match self {
            Self::Outside => 0,
            Self::TakeCard => 4,
            Self::Sensor2 => 6,
            Self::CardRead => 7,
            Self::FrontEnter => 8,
            Self::Other(code) => code,
        }
    }

    /// Movement command for this position
    pub fn command(self) -> Command {
        Command::MoveTo(self.code())
    }
}

impl TryFrom<u8> for Position {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FC{}", self.code())
    }
}
