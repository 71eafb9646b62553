//! Error types for cu16-core



/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Frame decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Frame is shorter than its shape requires
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },
    
    /// STX or ETX not where the layout puts them
    #[error("Bad frame markers: STX=0x{stx:02X}, ETX=0x{etx:02X}")]
    BadFrameMarkers {
        stx: u8,
        etx: u8,
    },
    
    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    ChecksumMismatch {
        expected: u8,
        received: u8,
    },
    
    /// Reply opcode is not the one the caller can interpret
    #[error("Unexpected response opcode: 0x{0:02X}")]
    UnexpectedOpcode(u8),
    
    /// Opcode outside the known command set
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),
}

impl Error {
    /// Check if the bytes were damaged or cut off in transit
    ///
    /// Opcode errors mean the frame arrived intact but carried something else.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::FrameTooShort { .. }
                | Self::BadFrameMarkers { .. }
                | Self::ChecksumMismatch { .. }
        )
    }
}
