//! # k720
//!
//! Host-side driver for K720 motorized card dispensers.
//!
//! ## Features
//!
//! - Framed command/response exchange over RS-232
//! - Card movement, dispensing and recycling
//! - Status queries decoded into named sensor states
//! - Mifare S50/S70/Ultralight card commands
//! - Scripted mock port for testing without hardware
//!
//! ## Quick Start
//!
//! ```no_run
//! use k720::{Dispenser, Position};
//!
//! fn main() -> k720::Result<()> {
//!     // Open the dispenser at address 15
//!     let mut dispenser = Dispenser::open("/dev/ttyS0", 15)?;
//!
//!     println!("Firmware: {}", dispenser.get_system_version()?);
//!
//!     // Issue a card to the bezel
//!     dispenser.move_to(Position::TakeCard)?;
//!
//!     for state in dispenser.sensor_state()?.descriptions() {
//!         println!("  {}", state);
//!     }
//!
//!     dispenser.close()?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;

// Re-exports
pub use device::Dispenser;
pub use error::{Error, Result};

// Re-export protocol types
pub use k720_core::{
    Address, Command, Frame, Session, SessionConfig, StateFlags, Verbosity, decode_state,
    describe_state,
};
pub use k720_transport::{MockPort, SerialTransport, Transport, available_ports};
pub use k720_types::{CardReply, CardTechnology, KeyType, Position};
