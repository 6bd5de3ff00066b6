//! High-level dispenser interface

use std::io::{Read, Write};

use bytes::Bytes;
use tracing::{debug, info, warn};

use k720_core::{Command, Session, SessionConfig, StateFlags, Verbosity, decode_state};
use k720_transport::{SerialTransport, Transport};
use k720_types::{CardTechnology, KeyType, Position};

use crate::error::Result;

/// K720 card dispenser
///
/// High-level interface over one addressed dispenser. Every method runs
/// one complete command/response exchange and blocks until the device
/// answers or the transport's read timeout expires.
///
/// The dispenser owns its transport, so `&mut self` already rules out
/// two exchanges interleaving on the same line. Nothing is retried;
/// callers decide with [`crate::Error::is_recoverable`] and drain the
/// line with [`Dispenser::clear_input`] before trying again.
///
/// # Examples
///
/// ```no_run
/// use k720::{Dispenser, Position};
///
/// fn main() -> k720::Result<()> {
///     let mut dispenser = Dispenser::open("/dev/ttyS0", 15)?;
///
///     println!("Version: {}", dispenser.get_system_version()?);
///     dispenser.move_to(Position::CardRead)?;
///
///     let state = dispenser.sensor_state()?;
///     println!("State: {}", state);
///
///     dispenser.close()?;
///     Ok(())
/// }
/// ```
pub struct Dispenser<T: Read + Write = SerialTransport> {
    transport: T,
    session: Session,
}

impl Dispenser<SerialTransport> {
    /// Open a serial port with default line settings (9600 8N1, 1 s timeout)
    pub fn open(path: impl Into<String>, address: u8) -> Result<Self> {
        Self::connect(SerialTransport::new(path), address)
    }

    /// Open a serial port at a custom baud rate
    pub fn open_with_baud(path: impl Into<String>, baud_rate: u32, address: u8) -> Result<Self> {
        Self::connect(SerialTransport::new(path).with_baud_rate(baud_rate), address)
    }
}

impl<T: Transport> Dispenser<T> {
    /// Connect `transport` and bind it to `address`
    pub fn connect(mut transport: T, address: u8) -> Result<Self> {
        let session = Session::new(address)?;

        info!("Connecting to dispenser {} on {}...", session.address(), transport.port_name());
        transport.connect()?;
        info!("Connected");

        Ok(Self { transport, session })
    }

    /// Check if the transport is open
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Close the transport
    pub fn close(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", self.transport.port_name());
        self.transport.disconnect()?;
        info!("Disconnected");
        Ok(())
    }

    /// Discard unread device output
    ///
    /// Call this before retrying a failed exchange: the device may still
    /// be sending the rest of the aborted frame.
    pub fn clear_input(&mut self) -> Result<()> {
        self.transport.clear_input()?;
        Ok(())
    }
}

impl<T: Read + Write> Dispenser<T> {
    /// Wrap an already open stream
    pub fn new(transport: T, address: u8) -> Result<Self> {
        Ok(Self {
            transport,
            session: Session::new(address)?,
        })
    }

    /// Set session configuration
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.session = self.session.with_config(config);
        self
    }

    /// Set frame logging level
    pub fn with_verbosity(self, verbosity: Verbosity) -> Self {
        let config = self.session.config().with_verbosity(verbosity);
        self.with_config(config)
    }

    /// Get session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get transport mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a typed command and return the raw response payload
    pub fn execute(&mut self, command: &Command) -> Result<Bytes> {
        debug!("Executing {}", command);
        let payload = self.session.exchange(&mut self.transport, &command.payload())?;
        Ok(payload)
    }

    /// Send an arbitrary command string (`"FC7"`, `"RS"`, ...) and return the raw payload
    pub fn send_command(&mut self, code: &[u8]) -> Result<Bytes> {
        self.execute(&Command::from(code))
    }

    /// Get firmware version (`GV`)
    pub fn get_system_version(&mut self) -> Result<String> {
        let payload = self.execute(&Command::GetVersion)?;
        let version = String::from_utf8_lossy(&payload).into_owned();

        debug!("Firmware version: {}", version);
        Ok(version)
    }

    /// Get dispenser status bytes (`RF`)
    ///
    /// The two-byte response code is stripped; the remainder feeds
    /// [`decode_state`].
    pub fn query(&mut self) -> Result<Bytes> {
        let payload = self.execute(&Command::Query)?;
        status_bytes(payload)
    }

    /// Get sensor status bytes (`AP`)
    pub fn sensor_query(&mut self) -> Result<Bytes> {
        let payload = self.execute(&Command::SensorQuery)?;
        status_bytes(payload)
    }

    /// Get decoded dispenser state (`RF`)
    pub fn query_state(&mut self) -> Result<StateFlags> {
        let status = self.query()?;
        Ok(StateFlags::from_state(decode_state(&status)))
    }

    /// Get decoded sensor state (`AP`)
    pub fn sensor_state(&mut self) -> Result<StateFlags> {
        let status = self.sensor_query()?;
        let state = StateFlags::from_state(decode_state(&status));

        debug!("Sensor state: {}", state);
        Ok(state)
    }

    /// Reset the mechanism (`RS`)
    pub fn reset(&mut self) -> Result<Bytes> {
        warn!("Resetting dispenser {}...", self.session.address());
        self.execute(&Command::Reset)
    }

    /// Move the card (`FC0`..`FC8`)
    pub fn move_to(&mut self, position: Position) -> Result<Bytes> {
        debug!("Moving card to {}", position);
        self.execute(&position.command())
    }

    /// Issue a card from the hopper (`DC`)
    pub fn dispense(&mut self) -> Result<Bytes> {
        self.execute(&Command::Dispense)
    }

    /// Pull the card back into the recycling box (`CP`)
    pub fn recycle(&mut self) -> Result<Bytes> {
        self.execute(&Command::Recycle)
    }

    /// Check for a card in the RF field
    ///
    /// The first payload byte is the reader's status (`'P'` on success);
    /// see [`k720_types::CardReply`].
    pub fn detect_card(&mut self, technology: CardTechnology) -> Result<Bytes> {
        self.execute(&technology.detect_command())
    }

    /// Read the card serial number
    ///
    /// On success the ID follows a three-byte prefix; see
    /// [`k720_types::CardReply::card_id`].
    pub fn get_card_id(&mut self, technology: CardTechnology) -> Result<Bytes> {
        self.execute(&technology.get_id_command())
    }

    /// Verify a sector key on an S50 card
    pub fn load_sector_key(&mut self, sector: u8, key_type: KeyType, key: &[u8]) -> Result<Bytes> {
        if key.is_empty() {
            return Err(k720_types::Error::Validation("sector key must not be empty".into()).into());
        }

        debug!("Loading key {:?} for sector {}", key_type, sector);
        self.execute(&Command::S50LoadKey {
            sector,
            key_type: key_type.code(),
            key: Bytes::copy_from_slice(key),
        })
    }
}

/// Strip the response code in front of report status bytes
fn status_bytes(payload: Bytes) -> Result<Bytes> {
    if payload.len() < 3 {
        return Err(k720_core::Error::ShortQueryPayload {
            actual: payload.len(),
        }
        .into());
    }
    Ok(payload.slice(2..))
}
