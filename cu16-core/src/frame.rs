//! CU16 frame structure, builders and validation

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    constants::{ETX, STX, frame_len},
    error::{Error, Result},
};

/// A complete, checksummed CU16 frame
///
/// # Frame Structure
///
/// ```text
/// ┌───────┬───────┬───────┬──────────────┬───────┬───────┐
/// │  STX  │ ADDR  │  CMD  │   DATA...    │  ETX  │  SUM  │
/// │ 0x02  │ 1 B   │ 1 B   │  0..N bytes  │ 0x03  │ 1 B   │
/// └───────┴───────┴───────┴──────────────┴───────┴───────┘
/// ```
///
/// `SUM` is the low byte of the sum of every byte before it. A `Frame` can only
/// be obtained from a builder or from [`Frame::decode`], so its markers and
/// checksum are always consistent.
///
/// # Examples
///
/// ```
/// use cu16_core::{build_simple, Frame};
///
/// let frame = build_simple(0x01, 0x30);
/// assert_eq!(frame.as_bytes(), &[0x02, 0x01, 0x30, 0x03, 0x36]);
///
/// let decoded = Frame::decode(frame.as_bytes()).unwrap();
/// assert_eq!(decoded.command(), 0x30);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Assemble STX ADDR CMD DATA.. ETX SUM
    pub(crate) fn assemble(addr: u8, cmd: u8, data: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(frame_len::MIN + data.len());
        
        buf.put_u8(STX);
        buf.put_u8(addr);
        buf.put_u8(cmd);
        buf.put_slice(data);
        buf.put_u8(ETX);
        
        let sum = checksum::calculate(&buf);
        buf.put_u8(sum);
        
        Self { bytes: buf.freeze() }
    }
    
    /// Validate and wrap a frame of any shape
    ///
    /// The whole input is taken as one frame: STX must be first, ETX second to
    /// last, and the final byte must be the checksum of the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Input is shorter than 5 bytes
    /// - STX or ETX is misplaced
    /// - Checksum verification fails
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < frame_len::MIN {
            return Err(Error::FrameTooShort {
                expected: frame_len::MIN,
                actual: bytes.len(),
            });
        }
        
        let etx = bytes[bytes.len() - 2];
        if bytes[0] != STX || etx != ETX {
            return Err(Error::BadFrameMarkers { stx: bytes[0], etx });
        }
        
        verify_checksum(bytes)?;
        
        Ok(Self {
            bytes: Bytes::copy_from_slice(bytes),
        })
    }
    
    /// Address byte
    pub fn address(&self) -> u8 {
        self.bytes[1]
    }
    
    /// Command or response opcode
    pub fn command(&self) -> u8 {
        self.bytes[2]
    }
    
    /// Payload between CMD and ETX
    pub fn data(&self) -> &[u8] {
        &self.bytes[3..self.bytes.len() - 2]
    }
    
    /// Trailing checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }
    
    /// Two data bytes read as a little-endian value, if the frame has that shape
    pub fn two_data_value(&self) -> Option<u16> {
        match self.data() {
            [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }
    
    /// Raw wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    
    /// Consume into the underlying buffer
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
    
    /// Total frame size
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
    
    /// Always false, a frame holds at least 5 bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Check the trailing checksum of a raw frame, reporting both sums on mismatch
pub(crate) fn verify_checksum(bytes: &[u8]) -> Result<()> {
    let (body, sum) = bytes.split_at(bytes.len() - 1);
    let expected = checksum::calculate(body);
    
    if expected != sum[0] {
        return Err(Error::ChecksumMismatch {
            expected,
            received: sum[0],
        });
    }
    
    Ok(())
}

/// Build STX ADDR CMD ETX SUM (5 bytes)
///
/// # Examples
///
/// ```
/// use cu16_core::build_simple;
///
/// assert_eq!(build_simple(0x01, 0x30).as_bytes(), &[0x02, 0x01, 0x30, 0x03, 0x36]);
/// ```
pub fn build_simple(addr: u8, cmd: u8) -> Frame {
    Frame::assemble(addr, cmd, &[])
}

/// Build STX ADDR CMD DATA ETX SUM (6 bytes)
pub fn build_one_data(addr: u8, cmd: u8, data: u8) -> Frame {
    Frame::assemble(addr, cmd, &[data])
}

/// Build STX ADDR CMD LO HI ETX SUM (7 bytes)
///
/// # Examples
///
/// ```
/// use cu16_core::build_two_data;
///
/// let frame = build_two_data(0x00, 0x37, 0x01F4);
/// assert_eq!(&frame.as_bytes()[3..5], &[0xF4, 0x01]);
/// assert_eq!(frame.two_data_value(), Some(500));
/// ```
pub fn build_two_data(addr: u8, cmd: u8, value: u16) -> Frame {
    Frame::assemble(addr, cmd, &value.to_le_bytes())
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("address", &format!("0x{:02X}", self.address()))
            .field("command", &format!("0x{:02X}", self.command()))
            .field("data", &hex::encode(self.data()))
            .field("checksum", &format!("0x{:02X}", self.checksum()))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{}]", hex::encode_upper(&self.bytes))
    }
}
