// src/block/header.rs
use crate::bitfield::BitField;
use byteorder::{ByteOrder, LittleEndian};

/// RIDF header shared by blocks and the records inside them.
///
/// On the wire a header is two little-endian 32-bit words. The first packs
/// `rev(2) | layer(2) | class(6) | size(22)`, with the size counted in 16-bit
/// words including the header itself; the second carries the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordHeader {
    pub revision: u8,
    pub layer: u8,
    pub class_id: u8,
    /// Size in bytes, header included
    pub size: u32,
    pub address: u32,
}

impl RecordHeader {
    pub const SIZE: usize = 8;
    /// Class IDs accepted for a top-level block header
    pub const BLOCK_CLASS_IDS: [u8; 3] = [0, 1, 2];

    const REVISION: BitField = BitField::new(0xc000_0000, 30);
    const LAYER: BitField = BitField::new(0x3000_0000, 28);
    const CLASS_ID: BitField = BitField::new(0x0fc0_0000, 22);
    const SIZE_WORDS: BitField = BitField::new(0x003f_ffff, 0);

    pub fn new(layer: u8, class_id: u8, size: u32) -> Self {
        RecordHeader {
            revision: 0,
            layer,
            class_id,
            size,
            address: 0,
        }
    }

    /// Parse a header from the start of `bytes`, or `None` if fewer than
    /// [`SIZE`](Self::SIZE) bytes are available.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let word = LittleEndian::read_u32(&bytes[0..4]);
        let address = LittleEndian::read_u32(&bytes[4..8]);
        Some(RecordHeader {
            revision: Self::REVISION.extract(word) as u8,
            layer: Self::LAYER.extract(word) as u8,
            class_id: Self::CLASS_ID.extract(word) as u8,
            size: Self::SIZE_WORDS.extract(word) * 2,
            address,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let word = Self::REVISION.place(self.revision as u32)
            | Self::LAYER.place(self.layer as u32)
            | Self::CLASS_ID.place(self.class_id as u32)
            | Self::SIZE_WORDS.place(self.size / 2);
        let mut bytes = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], word);
        LittleEndian::write_u32(&mut bytes[4..8], self.address);
        bytes
    }

    /// Whether this header may open a top-level block
    pub fn is_valid_block_header(&self) -> bool {
        self.layer == 0 && Self::BLOCK_CLASS_IDS.contains(&self.class_id)
    }

    /// Payload length in bytes, zero when the declared size is too small
    pub fn payload_len(&self) -> usize {
        (self.size as usize).saturating_sub(Self::SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bit_layout() {
        // layer 1, class 3, 10 words
        let word: u32 = (1 << 28) | (3 << 22) | 10;
        let mut bytes = [0u8; 8];
        LittleEndian::write_u32(&mut bytes[0..4], word);
        LittleEndian::write_u32(&mut bytes[4..8], 0xabcd);

        let header = RecordHeader::parse(&bytes).unwrap();
        assert_eq!(header.layer, 1);
        assert_eq!(header.class_id, 3);
        assert_eq!(header.size, 20);
        assert_eq!(header.address, 0xabcd);
        assert_eq!(header.payload_len(), 12);
        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn test_short_input() {
        assert!(RecordHeader::parse(&[0u8; 7]).is_none());
    }

    #[test]
    fn test_block_header_membership() {
        for class_id in 0..64u8 {
            let header = RecordHeader::new(0, class_id, 8);
            assert_eq!(header.is_valid_block_header(), class_id <= 2);
        }
        assert!(!RecordHeader::new(1, 0, 8).is_valid_block_header());
    }

    #[test]
    fn test_undersized_payload() {
        assert_eq!(RecordHeader::new(0, 4, 2).payload_len(), 0);
    }
}
