//! Errors raised while building or parsing value types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown key type selector: 0x{0:02X}")]
    UnknownKeyType(u8),

    #[error("Invalid position: FC{0} (expected FC0..FC8)")]
    InvalidPosition(u8),
}
