//! RS-232 transport

use std::io::{self, Read, Write};
use std::time::Duration;

use k720_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, trace, warn};

use crate::{Transport, error::*};

/// Serial transport for K720 dispensers
///
/// Line settings are fixed at 8N1 without flow control; baud rate and
/// read timeout are configurable.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use k720_transport::{SerialTransport, Transport};
///
/// let mut port = SerialTransport::new("/dev/ttyS0")
///     .with_baud_rate(19200)
///     .with_read_timeout(Duration::from_millis(500));
/// port.connect()?;
/// # Ok::<(), k720_transport::Error>(())
/// ```
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    read_timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create new serial transport (9600 baud, 1 s read timeout)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            port: None,
        }
    }

    /// Set baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Get baud rate
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Get read timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    fn port_mut(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(|| Error::NotConnected.into())
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.path, self.baud_rate);

        let port = serialport::new(&self.path, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.read_timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => Error::PortNotFound(self.path.clone()),
                _ => Error::Serial(e),
            })?;

        debug!("Opened {}", self.path);

        self.port = Some(port);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            debug!("Closing {}...", self.path);

            // Dropping the handle closes the device
            let _ = port.flush();
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn clear_input(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn port_name(&self) -> String {
        self.path.clone()
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.port_mut()?.read(buf)?;
        trace!("Received {} bytes: {:02X?}", n, &buf[..n.min(32)]);
        Ok(n)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        trace!("Sending {} bytes: {:02X?}", buf.len(), &buf[..buf.len().min(32)]);
        self.port_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port_mut()?.flush()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still connected");
        }
    }
}

/// Names of the serial ports present on this machine
pub fn available_ports() -> Result<Vec<String>> {
    let mut names: Vec<String> = serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();
    names.sort();
    Ok(names)
}
