//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,
    
    #[error("Already connected")]
    AlreadyConnected,
    
    #[error("Serial port not found: {0}")]
    PortNotFound(String),
    
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
    
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::NotConnected => io::Error::new(io::ErrorKind::NotConnected, "transport not connected"),
            other => io::Error::other(other),
        }
    }
}
