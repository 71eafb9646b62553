//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection timeout")]
    ConnectTimeout,
    
    #[error("Connection refused: {0}")]
    ConnectRefused(#[source] io::Error),
    
    #[error("Connection failed: {0}")]
    ConnectFailed(#[source] io::Error),
    
    #[error("No response from control unit")]
    NoResponse,
    
    #[error("Read timeout")]
    ReadTimeout,
    
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Check if the control unit could not be reached at all
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout
                | Self::ConnectRefused(_)
                | Self::ConnectFailed(_)
                | Self::InvalidAddress(_)
        )
    }
    
    /// Check if the connection was made but nothing usable came back
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoResponse | Self::ReadTimeout)
    }
}
