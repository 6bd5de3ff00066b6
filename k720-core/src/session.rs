//! Request/response exchange against one addressed dispenser
//!
//! The K720 line is half duplex. One exchange is:
//! 1. host writes a command frame
//! 2. device answers `ACK` + address (or `NAK`)
//! 3. host writes `ENQ` + address
//! 4. device answers with a response frame
//!
//! # Concurrency
//!
//! A session never owns or locks the stream. The four steps are not
//! atomic on the wire, so at most one exchange may be in flight per
//! connection; callers sharing a port must serialize access themselves.

use std::io::{Read, Write};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::{
    address::Address,
    constants::ACK,
    error::{Error, Result},
    frame::{self, hex_dump},
    reader::read_exact,
};

/// How much of the wire traffic a session logs
///
/// Frame dumps go through `tracing`; this only decides whether the
/// session emits them at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No frame logging
    #[default]
    Off,

    /// Whole frames at `debug`
    Debug,

    /// Whole frames plus each handshake step at `trace`
    Trace,
}

/// Session configuration, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Frame logging level
    pub verbosity: Verbosity,
}

impl SessionConfig {
    /// Set frame logging level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Exchange engine bound to one device address
///
/// # Examples
///
/// ```no_run
/// use k720_core::{Session, SessionConfig, Verbosity};
///
/// # fn run(port: &mut std::fs::File) -> k720_core::Result<()> {
/// let session = Session::new(15)?
///     .with_config(SessionConfig::default().with_verbosity(Verbosity::Debug));
///
/// let version = session.exchange(port, b"GV")?;
/// println!("{}", String::from_utf8_lossy(&version));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    address: Address,
    config: SessionConfig,
}

impl Session {
    /// Create a session for `address`
    pub fn new(address: u8) -> Result<Self> {
        Ok(Self {
            address: Address::new(address)?,
            config: SessionConfig::default(),
        })
    }

    /// Replace the session configuration
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Get device address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get session configuration
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Run one command/response exchange and return the response payload
    ///
    /// Any failure aborts the exchange; nothing is retried. After an
    /// error the line may still hold the rest of an aborted frame, and
    /// the next exchange reads its first byte as the ACK. Drain the line
    /// (`Transport::clear_input` in `k720-transport`) before retrying.
    ///
    /// # Errors
    ///
    /// - encoding: [`Error::InvalidAddress`], [`Error::EmptyPayload`], [`Error::PayloadTooLarge`]
    /// - handshake: [`Error::ShortAck`], [`Error::NotAcknowledged`], [`Error::AckAddressMismatch`]
    /// - framing: see [`frame::decode_response`] and [`frame::extract_payload`]
    /// - [`Error::Io`] from the stream, unchanged
    pub fn exchange<S: Read + Write + ?Sized>(&self, stream: &mut S, payload: &[u8]) -> Result<Bytes> {
        let command = frame::encode_command(self.address.value(), payload)?;
        self.dump("sent", &command);
        stream.write_all(&command)?;
        stream.flush()?;

        self.read_ack(stream)?;

        let enquiry = frame::encode_enquiry(self.address.value())?;
        self.step("Sending enquiry");
        stream.write_all(&enquiry)?;
        stream.flush()?;

        let response = frame::decode_response(stream, self.address)?;
        self.dump("received", &response);

        frame::extract_payload(&response)
    }

    fn read_ack<S: Read + ?Sized>(&self, stream: &mut S) -> Result<()> {
        let mut ack = [0u8; 1];
        if read_exact(stream, &mut ack)? != 1 {
            return Err(Error::ShortAck);
        }
        if ack[0] != ACK {
            debug!(received = format!("0x{:02X}", ack[0]), "Command not acknowledged");
            return Err(Error::NotAcknowledged { received: ack[0] });
        }

        let expected = self.address.to_ascii();
        let mut addr = [0u8; 2];
        let n = read_exact(stream, &mut addr)?;
        if n != addr.len() || addr != expected {
            return Err(Error::AckAddressMismatch {
                expected,
                received: addr[..n].to_vec(),
            });
        }

        self.step("Command acknowledged");
        Ok(())
    }

    fn dump(&self, direction: &str, bytes: &[u8]) {
        if self.config.verbosity >= Verbosity::Debug {
            debug!(address = %self.address, "{}: {}", direction, hex_dump(bytes));
        }
    }

    fn step(&self, message: &str) {
        if self.config.verbosity >= Verbosity::Trace {
            trace!(address = %self.address, "{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NAK;
    use pretty_assertions::assert_eq;
    use std::io::{self, Cursor};

    /// Serves pre-recorded device output, records host writes
    struct Line {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl Line {
        fn new(input: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(input),
                written: Vec::new(),
            }
        }
    }

    impl Read for Line {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Line {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn device_reply(address: u8, payload: &[u8]) -> Vec<u8> {
        let addr = Address::new(address).unwrap().to_ascii();
        let mut out = vec![ACK, addr[0], addr[1]];
        out.extend_from_slice(&frame::encode_command(address, payload).unwrap());
        out
    }

    #[test]
    fn test_session_new() {
        let session = Session::new(15).unwrap();
        assert_eq!(session.address().value(), 15);
        assert_eq!(session.config().verbosity, Verbosity::Off);
    }

    #[test]
    fn test_session_invalid_address() {
        assert!(matches!(Session::new(16), Err(Error::InvalidAddress(16))));
    }

    #[test]
    fn test_exchange_success() {
        let session = Session::new(5).unwrap();
        let mut line = Line::new(device_reply(5, b"RF0008"));

        let payload = session.exchange(&mut line, b"RF").unwrap();
        assert_eq!(payload.as_ref(), b"RF0008");

        let mut expected = frame::encode_command(5, b"RF").unwrap().to_vec();
        expected.extend_from_slice(&[0x05, b'0', b'5']);
        assert_eq!(line.written, expected);
    }

    #[test]
    fn test_exchange_with_logging() {
        let session = Session::new(15)
            .unwrap()
            .with_config(SessionConfig::default().with_verbosity(Verbosity::Trace));
        let mut line = Line::new(device_reply(15, b"K720V1.0"));

        let payload = session.exchange(&mut line, b"GV").unwrap();
        assert_eq!(payload.as_ref(), b"K720V1.0");
    }

    #[test]
    fn test_exchange_nak() {
        let session = Session::new(5).unwrap();
        let mut line = Line::new(vec![NAK, b'0', b'5']);

        assert!(matches!(
            session.exchange(&mut line, b"RF"),
            Err(Error::NotAcknowledged { received: NAK })
        ));
        // No enquiry after a NAK
        assert_eq!(line.written, frame::encode_command(5, b"RF").unwrap().to_vec());
    }

    #[test]
    fn test_exchange_silent_device() {
        let session = Session::new(5).unwrap();
        let mut line = Line::new(vec![]);

        assert!(matches!(session.exchange(&mut line, b"RF"), Err(Error::ShortAck)));
    }

    #[test]
    fn test_exchange_ack_wrong_address() {
        let session = Session::new(5).unwrap();
        let mut line = Line::new(vec![ACK, b'0', b'6']);

        match session.exchange(&mut line, b"RF") {
            Err(Error::AckAddressMismatch { expected, received }) => {
                assert_eq!(&expected, b"05");
                assert_eq!(received, b"06".to_vec());
            }
            other => panic!("Expected AckAddressMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_exchange_ack_short_address() {
        let session = Session::new(5).unwrap();
        let mut line = Line::new(vec![ACK, b'0']);

        assert!(matches!(
            session.exchange(&mut line, b"RF"),
            Err(Error::AckAddressMismatch { .. })
        ));
    }

    #[test]
    fn test_exchange_ack_single_digit_address_is_padded() {
        let session = Session::new(0).unwrap();
        let mut line = Line::new(device_reply(0, b"OK"));

        assert_eq!(session.exchange(&mut line, b"RS").unwrap().as_ref(), b"OK");
    }

    #[test]
    fn test_exchange_empty_payload() {
        let session = Session::new(5).unwrap();
        let mut line = Line::new(vec![]);

        assert!(matches!(session.exchange(&mut line, b""), Err(Error::EmptyPayload)));
        assert!(line.written.is_empty());
    }

    #[test]
    fn test_exchange_corrupt_response() {
        let session = Session::new(5).unwrap();
        let mut reply = device_reply(5, b"RF0008");
        let last = reply.len() - 1;
        reply[last] ^= 0x01;
        let mut line = Line::new(reply);

        assert!(matches!(
            session.exchange(&mut line, b"RF"),
            Err(Error::ChecksumMismatch { .. })
        ));
    }
}
