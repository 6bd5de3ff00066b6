//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] k720_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] k720_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] k720_types::Error),
}

impl Error {
    /// Check if retrying the whole request might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Core(e) => e.is_recoverable(),
            Self::Transport(k720_transport::Error::Io(_)) => true,
            _ => false,
        }
    }
}
