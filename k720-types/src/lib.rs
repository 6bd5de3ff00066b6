//! Type definitions for k720

pub mod card;
pub mod error;
pub mod position;

pub use card::{CardReply, CardTechnology, KeyType};
pub use error::{Error, Result};
pub use position::Position;
