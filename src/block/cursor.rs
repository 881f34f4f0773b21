// src/block/cursor.rs
use crate::block::RecordHeader;

/// One top-level block as read from a source: its header and body bytes
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub header: RecordHeader,
    pub data: Vec<u8>,
}

impl RawBlock {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Read position inside the current block.
///
/// The block is either absent or consumed through `offset`; it is exhausted
/// exactly when there is no block or the offset has reached its end.
#[derive(Debug, Default)]
pub struct BlockCursor {
    block: Option<RawBlock>,
    offset: usize,
}

impl BlockCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly read block and rewind to its start
    pub fn load(&mut self, block: RawBlock) {
        self.block = Some(block);
        self.offset = 0;
    }

    /// Discard the current block
    pub fn reset(&mut self) {
        self.block = None;
        self.offset = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        match &self.block {
            Some(block) => self.offset >= block.len(),
            None => true,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn block_size(&self) -> usize {
        self.block.as_ref().map_or(0, RawBlock::len)
    }

    pub fn block(&self) -> Option<&RawBlock> {
        self.block.as_ref()
    }

    /// The unread remainder together with the current offset
    pub(crate) fn remaining(&self) -> Option<(&[u8], usize)> {
        self.block.as_ref().map(|block| (block.data.as_slice(), self.offset))
    }

    pub(crate) fn advance_to(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Discard the current block, handing back its buffer for reuse
    pub(crate) fn take_buffer(&mut self) -> Option<Vec<u8>> {
        self.offset = 0;
        self.block.take().map(|block| block.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_tracks_block_and_offset() {
        let mut cursor = BlockCursor::new();
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.block_size(), 0);

        cursor.load(RawBlock {
            header: RecordHeader::new(0, 0, 24),
            data: vec![0u8; 16],
        });
        assert!(!cursor.is_exhausted());
        assert_eq!(cursor.block_size(), 16);

        cursor.advance_to(8);
        assert!(!cursor.is_exhausted());
        cursor.advance_to(16);
        assert!(cursor.is_exhausted());

        cursor.reset();
        assert!(cursor.block().is_none());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_empty_block_is_exhausted() {
        let mut cursor = BlockCursor::new();
        cursor.load(RawBlock {
            header: RecordHeader::new(0, 0, 8),
            data: Vec::new(),
        });
        assert!(cursor.is_exhausted());
    }
}
