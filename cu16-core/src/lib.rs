//! # cu16-core
//!
//! Core protocol implementation for CU16 locker control units.
//!
//! This crate provides the low-level protocol primitives:
//! - Address byte packing
//! - Frame structure, building and validation
//! - Additive checksum calculation
//! - Command and response opcodes
//! - Status response decoding
//!
//! Everything here is pure: no I/O and no shared state. The same codec is used
//! by the client side and by the simulator.

pub mod address;
pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod status;

pub use address::{make_address, split_address};
pub use command::{Command, Response};
pub use error::{Error, Result};
pub use frame::{build_one_data, build_simple, build_two_data, Frame};
pub use status::{build_status, parse_status, Status};

/// Number of door slots on one control unit
pub const DOORS_PER_UNIT: usize = 16;

/// Number of control units addressable on one logical bus
pub const MAX_UNITS: usize = 16;
