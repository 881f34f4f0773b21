// src/decoder/v7xx.rs
use crate::bitfield::BitField;
use crate::decoder::{words, ModuleDecoder};
use crate::types::{EdgeType, Hit};

/// Decoder for the CAEN V775/V785/V792 family of 32-channel converters.
///
/// The word type sits in bits 24..26 and the geometry in the top five bits
/// of every word. Data words become hits straight away; the converters have
/// no notion of edges so every hit carries [`EdgeType::Unknown`].
#[derive(Debug, Default)]
pub struct V7xxDecoder {
    skipped_words: usize,
}

impl V7xxDecoder {
    pub const ID: u8 = 21;

    pub const HEADER: u32 = 0x0200_0000;
    pub const DATA: u32 = 0x0000_0000;
    pub const END_OF_BLOCK: u32 = 0x0400_0000;
    pub const INVALID: u32 = 0x0600_0000;

    pub const TAG: BitField = BitField::new(0x0700_0000, 0);
    pub const GEOMETRY: BitField = BitField::new(0xf800_0000, 27);
    pub const CHANNEL: BitField = BitField::new(0x001f_0000, 16);
    /// 12-bit conversion plus the overflow bit
    pub const MEASURE: BitField = BitField::new(0x0000_1fff, 0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped_words(&self) -> usize {
        self.skipped_words
    }
}

impl ModuleDecoder for V7xxDecoder {
    fn id(&self) -> u8 {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "V7XX"
    }

    fn decode(&mut self, data: &[u8], hits: &mut Vec<Hit>) -> usize {
        let before = hits.len();
        self.skipped_words = 0;

        for word in words(data) {
            match Self::TAG.extract(word) {
                Self::DATA => hits.push(Hit {
                    geometry: Self::GEOMETRY.extract(word) as u8,
                    channel: Self::CHANNEL.extract(word) as u8,
                    measure: Self::MEASURE.extract(word),
                    edge: EdgeType::Unknown,
                }),
                Self::HEADER | Self::END_OF_BLOCK | Self::INVALID => {}
                tag => {
                    tracing::debug!(word = format_args!("{:#010x}", word), tag, "skipping unrecognized V7XX word");
                    self.skipped_words += 1;
                }
            }
        }

        hits.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::words_to_bytes as to_bytes;

    type D = V7xxDecoder;

    #[test]
    fn test_data_words() {
        let geo = D::GEOMETRY.place(7);
        let data = to_bytes(&[
            geo | D::HEADER | (2 << 8),
            geo | D::CHANNEL.place(0) | 1000,
            geo | D::CHANNEL.place(31) | 0x1fff,
            geo | D::END_OF_BLOCK | 42,
        ]);

        let mut decoder = D::new();
        let mut hits = Vec::new();
        assert_eq!(decoder.decode(&data, &mut hits), 2);
        assert_eq!(hits[0], Hit::new(7, 0, 1000, EdgeType::Unknown));
        assert_eq!(hits[1], Hit::new(7, 31, 0x1fff, EdgeType::Unknown));
        assert_eq!(decoder.skipped_words(), 0);
    }

    #[test]
    fn test_unknown_word_type() {
        let data = to_bytes(&[0x0100_0000, D::CHANNEL.place(3) | 5]);

        let mut decoder = D::new();
        let mut hits = Vec::new();
        decoder.decode(&data, &mut hits);
        assert_eq!(hits, vec![Hit::new(0, 3, 5, EdgeType::Unknown)]);
        assert_eq!(decoder.skipped_words(), 1);
    }
}
