// src/mapping/keys.rs
use std::fmt;

/// Raw hardware address of a channel: segment, geometry and channel.
///
/// `segment_id` holds the device, focal-plane and detector sub-IDs packed
/// into bits 8..26, the same positions they occupy in an RIDF segment ID.
/// The module byte and the revision bits never take part in a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HardwareKey {
    pub segment_id: u32,
    pub extra0: i32,
    pub extra1: i32,
}

impl HardwareKey {
    /// Bits of a raw segment ID that identify the segment for mapping
    pub const SEGMENT_MASK: u32 = 0x03ff_ff00;

    pub fn new(segment_id: u32, extra0: i32, extra1: i32) -> Self {
        HardwareKey { segment_id, extra0, extra1 }
    }

    /// Pack three 6-bit sub-IDs into a segment key
    pub fn pack_segment_id(id0: i32, id1: i32, id2: i32) -> u32 {
        (((id0 & 0x3f) as u32) << 20) | (((id1 & 0x3f) as u32) << 14) | (((id2 & 0x3f) as u32) << 8)
    }

    /// Build a key from the sub-IDs found in a map file
    pub fn from_ids(ids: [i32; 5]) -> Self {
        HardwareKey {
            segment_id: Self::pack_segment_id(ids[0], ids[1], ids[2]),
            extra0: ids[3],
            extra1: ids[4],
        }
    }

    /// Build a key for a decoded hit inside a raw segment
    pub fn for_hit(raw_segment_id: u32, geometry: u8, channel: u8) -> Self {
        HardwareKey {
            segment_id: raw_segment_id & Self::SEGMENT_MASK,
            extra0: geometry as i32,
            extra1: channel as i32,
        }
    }
}

impl fmt::Display for HardwareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg={:#010x} geo={} ch={}", self.segment_id, self.extra0, self.extra1)
    }
}

/// Resolved application-level address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalKey {
    pub category_id: i32,
    pub detector_id: i32,
    pub slot_index: i32,
}

impl LogicalKey {
    pub fn new(category_id: i32, detector_id: i32, slot_index: i32) -> Self {
        LogicalKey { category_id, detector_id, slot_index }
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat={} det={} slot={}", self.category_id, self.detector_id, self.slot_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_packing() {
        assert_eq!(HardwareKey::pack_segment_id(0, 0, 0), 0);
        assert_eq!(HardwareKey::pack_segment_id(1, 0, 0), 1 << 20);
        assert_eq!(HardwareKey::pack_segment_id(0, 2, 3), (2 << 14) | (3 << 8));
        // Sub-IDs are truncated to six bits
        assert_eq!(HardwareKey::pack_segment_id(0x41, 0, 0), 1 << 20);
    }

    #[test]
    fn test_hit_key_drops_module_and_revision() {
        let raw = (0x3f << 26) | HardwareKey::pack_segment_id(4, 5, 6) | 24;
        let key = HardwareKey::for_hit(raw, 3, 17);
        assert_eq!(key, HardwareKey::from_ids([4, 5, 6, 3, 17]));
    }
}
