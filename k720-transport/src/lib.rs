//! Transport layer for the K720 protocol
//!
//! Provides the RS-232 line to the dispenser, plus a scripted in-memory
//! port for tests and demos.

pub mod error;
pub mod mock;
pub mod serial;

pub use error::{Error, Result};
pub use mock::MockPort;
pub use serial::{SerialTransport, available_ports};

use std::io::{Read, Write};

/// Byte stream to a dispenser
///
/// Reads must honour a read timeout: when it expires with nothing
/// received they return `Ok(0)` or an `io::ErrorKind::TimedOut` error.
pub trait Transport: Read + Write + Send {
    /// Open the line
    fn connect(&mut self) -> Result<()>;
    
    /// Close the line
    fn disconnect(&mut self) -> Result<()>;
    
    /// Check if connected
    fn is_connected(&self) -> bool;
    
    /// Discard anything the device sent that nobody read
    fn clear_input(&mut self) -> Result<()>;
    
    /// Port name, for logging
    fn port_name(&self) -> String;
}
