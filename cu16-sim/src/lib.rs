//! In-memory CU16 hardware simulator
//!
//! [`HardwareState`] models the door arrays of one or more control units.
//! [`SimulatorServer`] puts it behind a TCP listener speaking the same frames
//! as real hardware, decoded and encoded with `cu16-core`.

pub mod error;
pub mod hardware;
pub mod server;

pub use error::{Error, Result};
pub use hardware::HardwareState;
pub use server::{SimulatorConfig, SimulatorHandle, SimulatorServer};
