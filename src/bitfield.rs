// src/bitfield.rs
//! Fixed-position field extraction from 32-bit module words.
//!
//! Every module decoder describes its word layout as a set of [`BitField`]
//! constants and pulls values out with [`BitField::extract`]:
//!
//! ```
//! use ridf_rs::bitfield::BitField;
//!
//! const CHANNEL: BitField = BitField::new(0x03f8_0000, 19);
//!
//! assert_eq!(CHANNEL.extract(0x0028_0000), 5);
//! ```

/// A field inside a 32-bit word, described by its mask and right shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub mask: u32,
    pub shift: u32,
}

impl BitField {
    pub const fn new(mask: u32, shift: u32) -> Self {
        BitField { mask, shift }
    }

    /// Returns `(word & mask) >> shift`.
    #[inline]
    pub const fn extract(&self, word: u32) -> u32 {
        (word & self.mask).wrapping_shr(self.shift)
    }

    /// Places `value` into the field's position, dropping bits outside the mask.
    ///
    /// The inverse of [`extract`](Self::extract) for values that fit the field;
    /// used to build synthetic words.
    #[inline]
    pub const fn place(&self, value: u32) -> u32 {
        value.wrapping_shl(self.shift) & self.mask
    }
}
