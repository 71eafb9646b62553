//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] cu16_core::Error),
    
    #[error("Transport error: {0}")]
    Transport(#[from] cu16_transport::Error),
    
    #[error("Invalid response length: expected at least {expected} bytes, got {actual}")]
    InvalidResponseLength {
        expected: usize,
        actual: usize,
    },
    
    #[error("Service is shut down")]
    ServiceShutdown,
    
    #[error("Worker stopped before answering")]
    WorkerLost,
    
    #[error("Failed to start worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Check if the control unit could not be reached or stayed silent
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect_failure() || e.is_silent())
    }
    
    /// Check if the control unit answered but the reply was unusable
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::Core(_) | Self::InvalidResponseLength { .. })
    }
}
