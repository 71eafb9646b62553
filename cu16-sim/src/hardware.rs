//! Door state of simulated control units

use std::collections::BTreeMap;

use cu16_core::{
    Command, DOORS_PER_UNIT, Frame, build_status, build_two_data, split_address,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// One simulated door slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    pub locked: bool,
    pub occupied: bool,
}

impl Default for Door {
    fn default() -> Self {
        Self {
            locked: true,
            occupied: false,
        }
    }
}

#[derive(Debug, Default)]
struct Unit {
    doors: [Door; DOORS_PER_UNIT],
    unlock_time: u16,
}

impl Unit {
    fn masks(&self) -> (u16, u16) {
        self.doors.iter().enumerate().fold((0, 0), |(locked, occupied), (i, door)| {
            (
                locked | (u16::from(door.locked) << i),
                occupied | (u16::from(door.occupied) << i),
            )
        })
    }
}

/// In-memory stand-in for CU16 boards
///
/// Every method takes the same lock for the whole model, so mutations are
/// serialized the way a real unit only ever handles one command at a time.
/// The lock is never held across I/O.
///
/// Unknown units and out-of-range doors are ignored silently.
///
/// # Examples
///
/// ```
/// use cu16_sim::HardwareState;
///
/// let hw = HardwareState::new();
/// hw.unlock_door(0, 3);
///
/// let doors = hw.door_states(0);
/// assert!(!doors[3]);
/// assert!(doors[4]);
/// assert!(hw.door_states(99).is_empty());
/// ```
#[derive(Debug)]
pub struct HardwareState {
    units: Mutex<BTreeMap<u8, Unit>>,
}

impl HardwareState {
    /// One control unit with id 0, every door locked
    pub fn new() -> Self {
        Self::with_units([0])
    }
    
    /// The given control units, every door locked
    pub fn with_units(ids: impl IntoIterator<Item = u8>) -> Self {
        let units = ids.into_iter().map(|id| (id, Unit::default())).collect();
        Self {
            units: Mutex::new(units),
        }
    }
    
    /// Ids of every simulated unit, ascending
    pub fn unit_ids(&self) -> Vec<u8> {
        self.units.lock().keys().copied().collect()
    }
    
    fn with_unit<R>(&self, cu_id: u8, f: impl FnOnce(&mut Unit) -> R) -> Option<R> {
        self.units.lock().get_mut(&cu_id).map(f)
    }
    
    fn with_door(&self, cu_id: u8, door_index: usize, f: impl FnOnce(&mut Door)) {
        self.with_unit(cu_id, |unit| {
            if let Some(door) = unit.doors.get_mut(door_index) {
                f(door);
            }
        });
    }
    
    /// Unlock one door
    pub fn unlock_door(&self, cu_id: u8, door_index: usize) {
        self.with_door(cu_id, door_index, |door| door.locked = false);
    }
    
    /// Lock one door again, as when it is pushed shut
    pub fn lock_door(&self, cu_id: u8, door_index: usize) {
        self.with_door(cu_id, door_index, |door| door.locked = true);
    }
    
    /// Unlock every door of a unit
    pub fn unlock_all(&self, cu_id: u8) {
        self.with_unit(cu_id, |unit| {
            for door in unit.doors.iter_mut() {
                door.locked = false;
            }
        });
    }
    
    /// Mark a door as holding a parcel or not
    pub fn set_occupied(&self, cu_id: u8, door_index: usize, occupied: bool) {
        self.with_door(cu_id, door_index, |door| door.occupied = occupied);
    }
    
    /// Locked flag per door, or an empty vector for an unknown unit
    pub fn door_states(&self, cu_id: u8) -> Vec<bool> {
        self.with_unit(cu_id, |unit| unit.doors.iter().map(|d| d.locked).collect())
            .unwrap_or_default()
    }
    
    /// `(locked, occupied)` bitmaps of a unit
    pub fn snapshot(&self, cu_id: u8) -> Option<(u16, u16)> {
        self.with_unit(cu_id, |unit| unit.masks())
    }
    
    /// Last lock pulse duration written to a unit
    pub fn unlock_time(&self, cu_id: u8) -> Option<u16> {
        self.with_unit(cu_id, |unit| unit.unlock_time)
    }
    
    /// Apply a decoded request and build the reply a board would send
    ///
    /// Returns `None` when a board would stay silent: unknown unit, unknown
    /// opcode, or a command without a reply.
    pub fn handle_request(&self, request: &Frame) -> Option<Frame> {
        let addr = request.address();
        let (cu_id, door) = split_address(addr);
        
        let command = match Command::try_from(request.command()) {
            Ok(command) => command,
            Err(e) => {
                warn!("Ignoring request: {}", e);
                return None;
            }
        };
        
        debug!(cu_id, door, %command, "Simulating request");
        
        let reply = self.with_unit(cu_id, |unit| {
            let response = command.expected_response()?;
            
            match command {
                Command::GetStatus | Command::GetAllBus => {}
                Command::UnlockOne => unit.doors[usize::from(door)].locked = false,
                Command::UnlockAll => {
                    for d in unit.doors.iter_mut() {
                        d.locked = false;
                    }
                }
                Command::SetUnlockTime => {
                    unit.unlock_time = request.two_data_value()?;
                    return Some(build_two_data(addr, response.into(), unit.unlock_time));
                }
                Command::SetDelayOrBaud => return None,
            }
            
            let (locked, occupied) = unit.masks();
            Some(build_status(addr, response.into(), locked, occupied))
        });
        
        reply.unwrap_or_else(|| {
            warn!(cu_id, "Unknown control unit");
            None
        })
    }
}

impl Default for HardwareState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cu16_core::{Response, build_simple, make_address, parse_status};
    use pretty_assertions::assert_eq;
    
    #[test]
    fn test_starts_fully_locked() {
        let hw = HardwareState::new();
        assert_eq!(hw.door_states(0), vec![true; DOORS_PER_UNIT]);
        assert_eq!(hw.snapshot(0), Some((0xFFFF, 0x0000)));
    }
    
    #[test]
    fn test_unlock_door() {
        let hw = HardwareState::new();
        hw.unlock_door(0, 5);
        
        let doors = hw.door_states(0);
        assert!(!doors[5]);
        assert_eq!(doors.iter().filter(|locked| **locked).count(), 15);
    }
    
    #[test]
    fn test_unlock_all_then_states() {
        let hw = HardwareState::new();
        hw.unlock_all(0);
        assert_eq!(hw.door_states(0), vec![false; DOORS_PER_UNIT]);
    }
    
    #[test]
    fn test_unknown_unit_is_ignored() {
        let hw = HardwareState::new();
        hw.unlock_door(7, 0);
        hw.unlock_all(7);
        
        assert!(hw.door_states(99).is_empty());
        assert_eq!(hw.snapshot(7), None);
        assert_eq!(hw.door_states(0), vec![true; DOORS_PER_UNIT]);
    }
    
    #[test]
    fn test_out_of_range_door_is_ignored() {
        let hw = HardwareState::new();
        hw.unlock_door(0, 16);
        hw.set_occupied(0, 200, true);
        assert_eq!(hw.snapshot(0), Some((0xFFFF, 0x0000)));
    }
    
    #[test]
    fn test_lock_and_occupy() {
        let hw = HardwareState::with_units([0, 2]);
        hw.unlock_all(2);
        hw.lock_door(2, 1);
        hw.set_occupied(2, 8, true);
        
        assert_eq!(hw.unit_ids(), vec![0, 2]);
        assert_eq!(hw.snapshot(2), Some((0x0002, 0x0100)));
    }
    
    #[test]
    fn test_handle_unlock_one() {
        let hw = HardwareState::new();
        let request = build_simple(make_address(0, 3), Command::UnlockOne.into());
        
        let reply = hw.handle_request(&request).unwrap();
        let status = parse_status(reply.as_bytes()).unwrap();
        
        assert_eq!(status.cmd, u8::from(Response::StatusSingle));
        assert_eq!(status.addr, 0x03);
        assert!(!status.locked[3]);
        assert!(status.locked[2]);
        assert!(!hw.door_states(0)[3]);
    }
    
    #[test]
    fn test_handle_unlock_all() {
        let hw = HardwareState::with_units([1]);
        let request = build_simple(make_address(1, 0), Command::UnlockAll.into());
        
        let status = parse_status(hw.handle_request(&request).unwrap().as_bytes()).unwrap();
        assert_eq!(status.cmd, u8::from(Response::StatusAll));
        assert_eq!(status.locked_mask(), 0);
    }
    
    #[test]
    fn test_handle_set_unlock_time() {
        let hw = HardwareState::new();
        let request = build_two_data(0x00, Command::SetUnlockTime.into(), 750);
        
        let reply = hw.handle_request(&request).unwrap();
        assert_eq!(reply.command(), u8::from(Response::UnlockTime));
        assert_eq!(reply.two_data_value(), Some(750));
        assert_eq!(hw.unlock_time(0), Some(750));
    }
    
    #[test]
    fn test_handle_silent_cases() {
        let hw = HardwareState::new();
        
        // unknown unit
        assert!(hw.handle_request(&build_simple(make_address(4, 0), 0x30)).is_none());
        // unknown opcode
        assert!(hw.handle_request(&build_simple(0x00, 0x7F)).is_none());
        // no reply defined
        assert!(hw.handle_request(&build_simple(0x00, 0x39)).is_none());
        // unlock time without a value
        assert!(hw.handle_request(&build_simple(0x00, 0x37)).is_none());
    }
}
