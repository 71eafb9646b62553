//! Transport layer for the CU16 protocol
//!
//! Provides a blocking, connection-per-request TCP client.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use bytes::Bytes;

/// One request/response exchange with a control unit
///
/// Implementations block the calling thread for the whole exchange and must
/// not let two exchanges overlap on the same instance.
pub trait Transport: Send + Sync {
    /// Send one frame and return the bytes of the first reply chunk
    fn send_and_receive(&self, frame: &[u8]) -> Result<Bytes>;
    
    /// Get remote address
    fn remote_addr(&self) -> String;
}
