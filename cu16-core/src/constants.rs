//! Protocol constants

/// Start-of-frame marker
pub const STX: u8 = 0x02;

/// End-of-frame marker
pub const ETX: u8 = 0x03;

/// Frame sizes by payload shape
pub mod frame_len {
    /// STX ADDR CMD ETX SUM
    pub const SIMPLE: usize = 5;

    /// STX ADDR CMD DATA ETX SUM
    pub const ONE_DATA: usize = 6;

    /// STX ADDR CMD LO HI ETX SUM
    pub const TWO_DATA: usize = 7;

    /// STX ADDR CMD D1 D2 D3 D4 ETX SUM
    pub const STATUS: usize = 9;

    /// Smallest well-formed frame
    pub const MIN: usize = SIMPLE;
}

/// Default connect timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;

/// Default read timeout (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 3000;

/// Largest reply accepted from a single read
pub const MAX_RESPONSE_SIZE: usize = 256;
