//! Door status response decoding

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use tracing::trace;

use crate::{
    DOORS_PER_UNIT,
    address::split_address,
    command::Response,
    constants::{ETX, STX, frame_len},
    error::{Error, Result},
    frame::{Frame, verify_checksum},
};

/// Decoded lock and occupancy state of one control unit
///
/// # Response Structure
///
/// ```text
/// ┌─────┬──────┬─────┬──────────────┬──────────────┬─────┬─────┐
/// │ STX │ ADDR │ CMD │   D1   D2    │   D3   D4    │ ETX │ SUM │
/// │     │      │     │ locked 0..15 │ occup. 0..15 │     │     │
/// └─────┴──────┴─────┴──────────────┴──────────────┴─────┴─────┘
/// ```
///
/// D1 holds doors 0-7 and D2 doors 8-15, bit `i` for door `i`. A set bit
/// means locked (D1/D2) or occupied (D3/D4).
#[derive(Clone, PartialEq, Eq)]
pub struct Status {
    /// Echoed address byte
    pub addr: u8,
    
    /// Response opcode
    pub cmd: u8,
    
    /// Lock flag per door
    pub locked: [bool; DOORS_PER_UNIT],
    
    /// Occupancy flag per door
    pub occupied: [bool; DOORS_PER_UNIT],
}

impl Status {
    /// Control unit id from the echoed address
    pub fn cu_id(&self) -> u8 {
        split_address(self.addr).0
    }
    
    /// Door index from the echoed address
    pub fn door_index(&self) -> u8 {
        split_address(self.addr).1
    }
    
    /// Check if `door` is locked; out-of-range doors read as unlocked
    pub fn is_locked(&self, door: usize) -> bool {
        self.locked.get(door).copied().unwrap_or(false)
    }
    
    /// Check if `door` is occupied; out-of-range doors read as empty
    pub fn is_occupied(&self, door: usize) -> bool {
        self.occupied.get(door).copied().unwrap_or(false)
    }
    
    /// Lock flags packed as a bitmap, bit `i` for door `i`
    pub fn locked_mask(&self) -> u16 {
        to_mask(&self.locked)
    }
    
    /// Occupancy flags packed as a bitmap, bit `i` for door `i`
    pub fn occupied_mask(&self) -> u16 {
        to_mask(&self.occupied)
    }
    
    /// Indices of every locked door
    pub fn locked_doors(&self) -> Vec<usize> {
        (0..DOORS_PER_UNIT).filter(|&i| self.locked[i]).collect()
    }
    
    /// Re-encode as a 9-byte status frame
    pub fn encode(&self) -> Frame {
        build_status(self.addr, self.cmd, self.locked_mask(), self.occupied_mask())
    }
}

fn to_mask(flags: &[bool; DOORS_PER_UNIT]) -> u16 {
    flags
        .iter()
        .enumerate()
        .fold(0u16, |mask, (i, &set)| if set { mask | (1 << i) } else { mask })
}

fn from_mask(mask: u16) -> [bool; DOORS_PER_UNIT] {
    std::array::from_fn(|i| ((mask >> i) & 1) == 1)
}

/// Parse a status response
///
/// Only the first 9 bytes are considered; anything after them belongs to a
/// following frame. Checks run in order: length, markers, checksum, opcode.
///
/// # Errors
///
/// - [`Error::FrameTooShort`] for fewer than 9 bytes
/// - [`Error::BadFrameMarkers`] if byte 0 is not STX or byte 7 is not ETX
/// - [`Error::ChecksumMismatch`] if the trailing sum does not match
/// - [`Error::UnexpectedOpcode`] if byte 2 is not a status response
///
/// # Examples
///
/// ```
/// use cu16_core::{build_status, parse_status};
///
/// let frame = build_status(0x00, 0x35, 0x00FF, 0xFF00);
/// let status = parse_status(frame.as_bytes()).unwrap();
///
/// assert!(status.locked[0] && !status.locked[8]);
/// assert!(!status.occupied[0] && status.occupied[15]);
/// ```
pub fn parse_status(bytes: &[u8]) -> Result<Status> {
    if bytes.len() < frame_len::STATUS {
        return Err(Error::FrameTooShort {
            expected: frame_len::STATUS,
            actual: bytes.len(),
        });
    }
    
    let p = &bytes[..frame_len::STATUS];
    
    if p[0] != STX || p[7] != ETX {
        return Err(Error::BadFrameMarkers { stx: p[0], etx: p[7] });
    }
    
    verify_checksum(p)?;
    
    let cmd = p[2];
    match Response::try_from(cmd) {
        Ok(resp) if resp.is_status() => {}
        _ => return Err(Error::UnexpectedOpcode(cmd)),
    }
    
    let locked = LittleEndian::read_u16(&p[3..5]);
    let occupied = LittleEndian::read_u16(&p[5..7]);
    
    trace!(
        addr = format!("0x{:02X}", p[1]),
        locked = format!("{:016b}", locked),
        occupied = format!("{:016b}", occupied),
        "Parsed status"
    );
    
    Ok(Status {
        addr: p[1],
        cmd,
        locked: from_mask(locked),
        occupied: from_mask(occupied),
    })
}

/// Build a 9-byte status response frame from lock and occupancy bitmaps
pub fn build_status(addr: u8, cmd: u8, locked: u16, occupied: u16) -> Frame {
    let mut data = [0u8; 4];
    LittleEndian::write_u16(&mut data[0..2], locked);
    LittleEndian::write_u16(&mut data[2..4], occupied);
    
    Frame::assemble(addr, cmd, &data)
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Status")
            .field("addr", &format!("0x{:02X}", self.addr))
            .field("cmd", &format!("0x{:02X}", self.cmd))
            .field("locked", &format!("{:016b}", self.locked_mask()))
            .field("occupied", &format!("{:016b}", self.occupied_mask()))
            .finish()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status[cu={}](locked={}/{}, occupied={}/{})",
            self.cu_id(),
            self.locked_mask().count_ones(),
            DOORS_PER_UNIT,
            self.occupied_mask().count_ones(),
            DOORS_PER_UNIT
        )
    }
}
