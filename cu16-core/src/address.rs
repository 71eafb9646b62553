//! Address byte packing
//!
//! ```text
//! ┌───────────────┬───────────────┐
//! │  cu_id (hi)   │  door (lo)    │
//! │    4 bits     │    4 bits     │
//! └───────────────┴───────────────┘
//! ```
//!
//! Out-of-range ids are masked to their low nibble, never rejected.

/// Pack a control unit id and door index into one address byte
///
/// # Examples
///
/// ```
/// use cu16_core::make_address;
///
/// assert_eq!(make_address(1, 3), 0x13);
/// // Only the low nibble of each part survives
/// assert_eq!(make_address(0x12, 0x1F), 0x2F);
/// ```
pub fn make_address(cu_id: u8, door_index: u8) -> u8 {
    ((cu_id & 0x0F) << 4) | (door_index & 0x0F)
}

/// Split an address byte into `(cu_id, door_index)`
pub fn split_address(addr: u8) -> (u8, u8) {
    (addr >> 4, addr & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    
    #[test]
    fn test_make_address_corners() {
        assert_eq!(make_address(0, 0), 0x00);
        assert_eq!(make_address(15, 15), 0xFF);
        assert_eq!(make_address(0, 1), 0x01);
        assert_eq!(make_address(2, 0), 0x20);
    }
    
    #[test]
    fn test_make_address_masks() {
        assert_eq!(make_address(16, 0), 0x00);
        assert_eq!(make_address(0, 16), 0x00);
        assert_eq!(make_address(0xFF, 0xFF), 0xFF);
    }
    
    #[test]
    fn test_split_address() {
        assert_eq!(split_address(0x2A), (2, 10));
    }
    
    proptest! {
        #[test]
        fn prop_in_range_packs_exactly(cu in 0u8..16, door in 0u8..16) {
            prop_assert_eq!(make_address(cu, door), (cu << 4) | door);
            prop_assert_eq!(split_address(make_address(cu, door)), (cu, door));
        }
        
        #[test]
        fn prop_out_of_range_is_masked(cu in any::<u8>(), door in any::<u8>()) {
            prop_assert_eq!(make_address(cu, door), make_address(cu & 0x0F, door & 0x0F));
        }
    }
}
