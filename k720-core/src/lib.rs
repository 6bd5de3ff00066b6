//! # k720-core
//!
//! Core protocol implementation for K720 card dispensers.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - BCC checksum calculation
//! - Byte-accurate reads over a timing-out stream
//! - The ENQ/ACK exchange against one addressed device
//! - Status decoding into named device states
//! - Command definitions

pub mod address;
pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod reader;
pub mod session;
pub mod state;

pub use address::Address;
pub use command::Command;
pub use error::{Error, Result};
pub use frame::Frame;
pub use session::{Session, SessionConfig, Verbosity};
pub use state::{StateFlags, decode_state, describe_state};

/// Bytes preceding the payload: STX, two address digits, two length bytes
pub const HEADER_SIZE: usize = 5;

/// Bytes following the payload: ETX and BCC
pub const TRAILER_SIZE: usize = 2;

/// Largest payload a single frame can carry
pub const MAX_PAYLOAD_SIZE: usize = 255;
