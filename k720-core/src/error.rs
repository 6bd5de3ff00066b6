//! Error types for k720-core

/// Result type alias for k720 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Device address outside 0..=15
    #[error("Invalid address: {0} (expected 0..=15)")]
    InvalidAddress(u8),

    /// Command frames must carry at least one payload byte
    #[error("Empty payload - command frames require at least one byte")]
    EmptyPayload,

    /// Payload does not fit the single-byte length field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// No acknowledgement byte arrived before the read timeout
    #[error("No acknowledgement received")]
    ShortAck,

    /// Device answered with something other than ACK
    #[error("Command not acknowledged: received 0x{received:02X}")]
    NotAcknowledged {
        received: u8,
    },

    /// Acknowledgement carried the wrong (or an incomplete) address
    #[error("Acknowledgement address mismatch: expected {expected:02X?}, received {received:02X?}")]
    AckAddressMismatch {
        expected: [u8; 2],
        received: Vec<u8>,
    },

    /// First byte of the response is not STX
    #[error("Malformed frame start: expected 0x02, received 0x{received:02X}")]
    MalformedStart {
        received: u8,
    },

    /// Response frame addressed to another device
    #[error("Response address mismatch: expected {expected:02X?}, received {received:02X?}")]
    AddressMismatch {
        expected: [u8; 2],
        received: [u8; 2],
    },

    /// Length field could not be read in full
    #[error("Short length field: expected 2 bytes, got {actual} bytes")]
    ShortLength {
        actual: usize,
    },

    /// Fewer payload bytes arrived than the length field announced
    #[error("Payload length mismatch: expected {expected} bytes, got {actual} bytes")]
    LengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Byte after the payload is not ETX
    #[error("Malformed frame end: expected 0x03, received 0x{received:02X}")]
    MalformedEnd {
        received: u8,
    },

    /// BCC verification failed
    #[error("Checksum mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    ChecksumMismatch {
        expected: u8,
        received: u8,
    },

    /// Stream went quiet in the middle of a frame field
    #[error("Truncated frame: {field} missing")]
    Truncated {
        field: &'static str,
    },

    /// Frame is too short to hold a header, or its length field points past the end
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Report payload too short to carry status bytes
    #[error("Query payload too short: expected at least 3 bytes, got {actual} bytes")]
    ShortQueryPayload {
        actual: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::reader::ReadError> for Error {
    fn from(err: crate::reader::ReadError) -> Self {
        Self::Io(err.source)
    }
}

impl Error {
    /// Check if error is recoverable (retrying the whole exchange might succeed)
    ///
    /// Only after the stale input has been drained; see [`crate::Session::exchange`].
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ShortAck
                | Self::NotAcknowledged { .. }
                | Self::Truncated { .. }
                | Self::ShortLength { .. }
                | Self::LengthMismatch { .. }
                | Self::MalformedStart { .. }
                | Self::MalformedEnd { .. }
                | Self::ChecksumMismatch { .. }
                | Self::Io(_)
        )
    }

    /// Check if error requires reopening the transport
    pub fn requires_reconnect(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_errors_not_recoverable() {
        assert!(!Error::InvalidAddress(16).is_recoverable());
        assert!(!Error::EmptyPayload.is_recoverable());
    }

    #[test]
    fn test_line_errors_recoverable() {
        assert!(Error::ShortAck.is_recoverable());
        assert!(Error::NotAcknowledged { received: 0x15 }.is_recoverable());
        assert!(Error::ChecksumMismatch { expected: 1, received: 2 }.is_recoverable());
        assert!(!Error::ShortAck.requires_reconnect());
    }

    #[test]
    fn test_io_requires_reconnect() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(err.requires_reconnect());
    }
}
