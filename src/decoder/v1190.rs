// src/decoder/v1190.rs
use crate::bitfield::BitField;
use crate::decoder::{words, ModuleDecoder};
use crate::types::{EdgeType, Hit};
use smallvec::SmallVec;

/// An error word reported by one TDC chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TdcError {
    pub geometry: u8,
    pub flags: u32,
}

/// Decoder for the CAEN V1190 multihit TDC.
///
/// Each word is classified by its top five bits. A readout looks like
///
/// ```text
/// GlobalHeader
///   TDCHeader  { TDCMeasurement }*  TDCTrailer     (per TDC chip)
/// GlobalTrailer
/// ```
///
/// Measurements are buffered against the geometry of the current TDC header
/// and released when the TDC trailer (or the global trailer, for readouts
/// without TDC headers) arrives. Error words are recorded and decoding goes
/// on.
#[derive(Debug, Default)]
pub struct V1190Decoder {
    pending: SmallVec<[Hit; 16]>,
    geometry: u8,
    event_counter: u32,
    event_id: u32,
    bunch_id: u32,
    errors: Vec<TdcError>,
    skipped_words: usize,
}

impl V1190Decoder {
    pub const ID: u8 = 24;

    pub const HEADER_MASK: u32 = 0xf800_0000;
    pub const GLOBAL_HEADER: u32 = 0x4000_0000;
    pub const TDC_HEADER: u32 = 0x0800_0000;
    pub const TDC_MEASUREMENT: u32 = 0x0000_0000;
    pub const TDC_TRAILER: u32 = 0x1800_0000;
    pub const TDC_ERROR: u32 = 0x2000_0000;
    pub const EXTENDED_TRIGGER_TIME: u32 = 0x8800_0000;
    pub const GLOBAL_TRAILER: u32 = 0x8000_0000;
    pub const FILLER: u32 = 0xc000_0000;

    pub const TAG: BitField = BitField::new(Self::HEADER_MASK, 0);
    pub const GEOMETRY: BitField = BitField::new(0x0000_001f, 0);
    pub const EVENT_COUNTER: BitField = BitField::new(0x07ff_ffe0, 5);
    pub const BUNCH_ID: BitField = BitField::new(0x0000_0fff, 0);
    pub const EVENT_ID: BitField = BitField::new(0x00ff_f000, 12);
    pub const CHANNEL: BitField = BitField::new(0x03f8_0000, 19);
    pub const MEASURE: BitField = BitField::new(0x0007_ffff, 0);
    pub const EDGE_TYPE: BitField = BitField::new(0x0400_0000, 26);
    pub const ERROR_FLAGS: BitField = BitField::new(0x0000_7fff, 0);

    pub fn new() -> Self {
        Self::default()
    }

    /// Error words seen in the most recent segment
    pub fn errors(&self) -> &[TdcError] {
        &self.errors
    }

    /// Words with an unknown tag in the most recent segment
    pub fn skipped_words(&self) -> usize {
        self.skipped_words
    }

    pub fn event_counter(&self) -> u32 {
        self.event_counter
    }

    pub fn event_id(&self) -> u32 {
        self.event_id
    }

    pub fn bunch_id(&self) -> u32 {
        self.bunch_id
    }

    fn flush(&mut self, hits: &mut Vec<Hit>) {
        hits.extend(self.pending.drain(..));
    }
}

impl ModuleDecoder for V1190Decoder {
    fn id(&self) -> u8 {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "V1190"
    }

    fn decode(&mut self, data: &[u8], hits: &mut Vec<Hit>) -> usize {
        let before = hits.len();
        self.pending.clear();
        self.errors.clear();
        self.skipped_words = 0;
        self.geometry = 0;

        for word in words(data) {
            match Self::TAG.extract(word) {
                Self::GLOBAL_HEADER => {
                    self.flush(hits);
                    self.geometry = Self::GEOMETRY.extract(word) as u8;
                    self.event_counter = Self::EVENT_COUNTER.extract(word);
                }
                Self::TDC_HEADER => {
                    self.flush(hits);
                    self.geometry = Self::GEOMETRY.extract(word) as u8;
                    self.event_id = Self::EVENT_ID.extract(word);
                    self.bunch_id = Self::BUNCH_ID.extract(word);
                }
                Self::TDC_MEASUREMENT => {
                    self.pending.push(Hit {
                        geometry: self.geometry,
                        channel: Self::CHANNEL.extract(word) as u8,
                        measure: Self::MEASURE.extract(word),
                        edge: EdgeType::from_bit(Self::EDGE_TYPE.extract(word)),
                    });
                }
                Self::TDC_TRAILER | Self::GLOBAL_TRAILER => self.flush(hits),
                Self::TDC_ERROR => {
                    let error = TdcError {
                        geometry: self.geometry,
                        flags: Self::ERROR_FLAGS.extract(word),
                    };
                    tracing::debug!(geometry = error.geometry, flags = error.flags, "V1190 TDC error word");
                    self.errors.push(error);
                }
                Self::EXTENDED_TRIGGER_TIME | Self::FILLER => {}
                tag => {
                    tracing::debug!(word = format_args!("{:#010x}", word), tag, "skipping unrecognized V1190 word");
                    self.skipped_words += 1;
                }
            }
        }

        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "V1190 segment ended without trailer");
            self.flush(hits);
        }

        hits.len() - before
    }
}
