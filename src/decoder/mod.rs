// src/decoder/mod.rs
//! Module decoders turn the 32-bit words of one segment into [`Hit`]s.
//!
//! A segment ID carries the module type in its low byte; the
//! [`ModuleRegistry`] selects the decoder registered for that ID.
//!
//! ```
//! use ridf_rs::decoder::{ModuleRegistry, V1190Decoder};
//!
//! let registry = ModuleRegistry::with_defaults();
//! assert!(registry.contains(V1190Decoder::ID));
//! ```

mod v1190;
mod v7xx;

pub use v1190::{TdcError, V1190Decoder};
pub use v7xx::V7xxDecoder;

use crate::types::Hit;
use byteorder::{ByteOrder, LittleEndian};
use std::collections::HashMap;

/// Decoder for the word format of one module type
pub trait ModuleDecoder: Send {
    /// Module ID found in the low byte of a segment ID
    fn id(&self) -> u8;

    fn name(&self) -> &'static str;

    /// Decode every word of `data`, appending the resulting hits.
    ///
    /// Words the decoder does not recognise are skipped. Returns the number
    /// of hits appended.
    fn decode(&mut self, data: &[u8], hits: &mut Vec<Hit>) -> usize;
}

/// Iterate the little-endian 32-bit words of a segment payload
pub(crate) fn words(data: &[u8]) -> impl Iterator<Item = u32> + '_ {
    let chunks = data.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        tracing::debug!(
            trailing = chunks.remainder().len(),
            "segment payload is not a whole number of words"
        );
    }
    chunks.map(LittleEndian::read_u32)
}

/// Module decoders keyed by module ID
#[derive(Default)]
pub struct ModuleRegistry {
    decoders: HashMap<u8, Box<dyn ModuleDecoder>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every decoder this crate provides
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(V1190Decoder::new()));
        registry.register(Box::new(V7xxDecoder::new()));
        registry
    }

    /// Register a decoder, replacing any previous one with the same ID
    pub fn register(&mut self, decoder: Box<dyn ModuleDecoder>) -> Option<Box<dyn ModuleDecoder>> {
        self.decoders.insert(decoder.id(), decoder)
    }

    pub fn contains(&self, module_id: u8) -> bool {
        self.decoders.contains_key(&module_id)
    }

    pub fn get_mut(&mut self, module_id: u8) -> Option<&mut (dyn ModuleDecoder + '_)> {
        match self.decoders.get_mut(&module_id) {
            Some(decoder) => Some(decoder.as_mut()),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}
