//! CU16 checksum algorithm
//!
//! The trailing byte of every frame is the low byte of the arithmetic sum of
//! all bytes before it. There is no complement and no carry folding.

use tracing::trace;

use crate::constants::frame_len;

/// Calculate the checksum over `bytes`
///
/// # Examples
///
/// ```
/// use cu16_core::checksum;
///
/// // STX ADDR CMD ETX
/// assert_eq!(checksum::calculate(&[0x02, 0x01, 0x30, 0x03]), 0x36);
/// ```
pub fn calculate(bytes: &[u8]) -> u8 {
    let checksum = bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
    
    trace!(
        len = bytes.len(),
        checksum = format!("0x{:02X}", checksum),
        "Calculated checksum"
    );
    
    checksum
}

/// Verify the trailing checksum byte of a complete frame
///
/// Returns `false` for anything shorter than the smallest frame.
///
/// # Examples
///
/// ```
/// use cu16_core::checksum;
///
/// assert!(checksum::verify(&[0x02, 0x01, 0x30, 0x03, 0x36]));
/// assert!(!checksum::verify(&[0x02, 0x01, 0x30, 0x03, 0x37]));
/// assert!(!checksum::verify(&[]));
/// ```
pub fn verify(frame: &[u8]) -> bool {
    if frame.len() < frame_len::MIN {
        return false;
    }
    
    let (body, sum) = frame.split_at(frame.len() - 1);
    calculate(body) == sum[0]
}
