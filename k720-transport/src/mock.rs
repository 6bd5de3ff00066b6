//! Scripted in-memory port
//!
//! Plays back device output step by step and records everything the
//! host writes. Steps can split a reply into chunks, go quiet (read
//! timeout) or fail, which is enough to exercise every branch of the
//! exchange without hardware.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use k720_core::{Address, constants::ACK, frame};
use tracing::trace;

use crate::{Transport, error::*};

#[derive(Debug)]
enum Step {
    Data(Vec<u8>),
    Timeout,
    Fail(io::ErrorKind),
}

/// In-memory dispenser line
///
/// An exhausted script behaves like a silent device: reads time out.
///
/// # Examples
///
/// ```
/// use k720_core::Session;
/// use k720_transport::MockPort;
///
/// let mut port = MockPort::new();
/// port.push_reply(15, b"K720 V2.1").unwrap();
///
/// let session = Session::new(15).unwrap();
/// let payload = session.exchange(&mut port, b"GV").unwrap();
/// assert_eq!(payload.as_ref(), b"K720 V2.1");
/// ```
#[derive(Debug, Default)]
pub struct MockPort {
    script: VecDeque<Step>,
    written: Vec<u8>,
    connected: bool,
}

impl MockPort {
    /// Create a connected port with an empty script
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Queue bytes, delivered by as few reads as the caller's buffers allow
    pub fn push_read(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.script.push_back(Step::Data(bytes.into()));
        self
    }

    /// Queue bytes split into reads of at most `chunk` bytes
    pub fn push_chunked(&mut self, bytes: &[u8], chunk: usize) -> &mut Self {
        for part in bytes.chunks(chunk.max(1)) {
            self.script.push_back(Step::Data(part.to_vec()));
        }
        self
    }

    /// Queue one read that times out with nothing received
    pub fn push_timeout(&mut self) -> &mut Self {
        self.script.push_back(Step::Timeout);
        self
    }

    /// Queue one read that fails
    pub fn push_error(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.script.push_back(Step::Fail(kind));
        self
    }

    /// Queue `ACK` + address followed by a well-formed response frame
    ///
    /// # Errors
    ///
    /// Any framing error for `address` or `payload`; nothing is queued.
    pub fn push_reply(&mut self, address: u8, payload: &[u8]) -> k720_core::Result<&mut Self> {
        let addr = Address::new(address)?;
        let response = frame::encode_command(address, payload)?;

        self.push_ack(addr);
        Ok(self.push_read(response.to_vec()))
    }

    /// Queue `ACK` + address only
    pub fn push_ack(&mut self, address: Address) -> &mut Self {
        let [hi, lo] = address.to_ascii();
        self.push_read(vec![ACK, hi, lo])
    }

    /// Everything written so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Drain the write log
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Steps not consumed yet
    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected.into());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        match self.script.pop_front() {
            Some(Step::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.script.push_front(Step::Data(data.split_off(n)));
                }
                trace!("Mock delivered {} bytes", n);
                Ok(n)
            }
            Some(Step::Fail(kind)) => Err(io::Error::from(kind)),
            Some(Step::Timeout) | None => Err(io::Error::from(io::ErrorKind::TimedOut)),
        }
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected.into());
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockPort {
    fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(Error::AlreadyConnected);
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn clear_input(&mut self) -> Result<()> {
        self.script.clear();
        Ok(())
    }

    fn port_name(&self) -> String {
        "mock".to_string()
    }
}
