//! # cu16
//!
//! Rust implementation of the CU16 parcel-locker control unit protocol.
//!
//! ## Features
//!
//! - Checksummed frame codec shared with the simulator
//! - Blocking, connection-per-request TCP transport
//! - One worker per service: commands never overlap on the wire
//! - Results delivered through awaitable [`CommandHandle`]s
//!
//! ## Quick Start
//!
//! ```no_run
//! use cu16::{Cu16Service, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let mut service = Cu16Service::from_config(&config)?;
//!     
//!     // Queue two commands; they run one after the other
//!     let unlock = service.unlock_door(3);
//!     let status = service.get_status(3);
//!     
//!     println!("{}", unlock.await?);
//!     println!("{}", status.await?);
//!     
//!     tokio::task::spawn_blocking(move || service.shutdown()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod service;

// Re-exports
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use handle::CommandHandle;
pub use service::{Cu16Service, ServiceState};

// Re-export protocol types
pub use cu16_core::{Command, Frame, Response, Status, make_address};
pub use cu16_transport::{TcpTransport, Transport};
