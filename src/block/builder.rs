// src/block/builder.rs
use bytes::{BufMut, Bytes, BytesMut};
use crate::block::RecordHeader;
use crate::dispatch::class;

/// Assembles RIDF blocks in wire format.
///
/// Used to produce synthetic streams for live feeds, tests and benchmarks.
///
/// # Example
///
/// ```
/// use ridf_rs::block::BlockBuilder;
///
/// let mut block = BlockBuilder::new();
/// block.event(1, |event| {
///     event.segment(0x0010_0018, &[0x4000_0000, 0x8000_0000]);
/// });
/// let bytes = block.finish();
/// assert_eq!(bytes.len(), 8 + 8 + 4 + 8 + 4 + 8);
/// ```
pub struct BlockBuilder {
    class_id: u8,
    body: BytesMut,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::with_class(0)
    }

    /// A block whose top-level header carries `class_id`
    pub fn with_class(class_id: u8) -> Self {
        BlockBuilder {
            class_id,
            body: BytesMut::with_capacity(8192),
        }
    }

    /// Append a record with an arbitrary payload, padded to a 16-bit boundary
    pub fn record(&mut self, class_id: u8, payload: &[u8]) -> &mut Self {
        put_record(&mut self.body, 1, class_id, payload);
        self
    }

    /// Append a record whose header declares `size` bytes regardless of payload
    pub fn raw_record(&mut self, header: RecordHeader, payload: &[u8]) -> &mut Self {
        self.body.put_slice(&header.to_bytes());
        self.body.put_slice(payload);
        self
    }

    /// Append a top-level segment record
    pub fn segment(&mut self, segment_id: u32, words: &[u32]) -> &mut Self {
        put_segment(&mut self.body, 1, segment_id, words);
        self
    }

    /// Append an event header record with nested contents
    pub fn event(&mut self, event_number: u32, build: impl FnOnce(&mut EventBuilder)) -> &mut Self {
        let mut event = EventBuilder::new();
        build(&mut event);
        let mut payload = BytesMut::with_capacity(4 + event.body.len());
        payload.put_u32_le(event_number);
        payload.put_slice(&event.body);
        put_record(&mut self.body, 1, class::EVENT_HEADER, &payload);
        self
    }

    /// Append a timestamped event header record with nested contents
    pub fn timestamped_event(
        &mut self,
        event_number: u32,
        timestamp: u64,
        build: impl FnOnce(&mut EventBuilder),
    ) -> &mut Self {
        let mut event = EventBuilder::new();
        build(&mut event);
        let mut payload = BytesMut::with_capacity(12 + event.body.len());
        payload.put_u32_le(event_number);
        payload.put_u64_le(timestamp);
        payload.put_slice(&event.body);
        put_record(&mut self.body, 1, class::TIMESTAMPED_EVENT_HEADER, &payload);
        self
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Emit the block header followed by the body
    pub fn finish(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(RecordHeader::SIZE + self.body.len());
        put_record(&mut out, 0, self.class_id, &self.body);
        out.freeze()
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Contents of one event record
pub struct EventBuilder {
    body: BytesMut,
}

impl EventBuilder {
    fn new() -> Self {
        EventBuilder {
            body: BytesMut::with_capacity(1024),
        }
    }

    pub fn segment(&mut self, segment_id: u32, words: &[u32]) -> &mut Self {
        put_segment(&mut self.body, 2, segment_id, words);
        self
    }

    pub fn record(&mut self, class_id: u8, payload: &[u8]) -> &mut Self {
        put_record(&mut self.body, 2, class_id, payload);
        self
    }
}

fn put_segment(out: &mut BytesMut, layer: u8, segment_id: u32, words: &[u32]) {
    let mut payload = BytesMut::with_capacity(4 + words.len() * 4);
    payload.put_u32_le(segment_id);
    for &word in words {
        payload.put_u32_le(word);
    }
    put_record(out, layer, class::SEGMENT, &payload);
}

fn put_record(out: &mut BytesMut, layer: u8, class_id: u8, payload: &[u8]) {
    let padded = payload.len() + payload.len() % 2;
    let header = RecordHeader::new(layer, class_id, (RecordHeader::SIZE + padded) as u32);
    out.put_slice(&header.to_bytes());
    out.put_slice(payload);
    if padded != payload.len() {
        out.put_u8(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_header_covers_body() {
        let mut builder = BlockBuilder::new();
        builder.record(5, b"abc");
        let bytes = builder.finish();

        let header = RecordHeader::parse(&bytes).unwrap();
        assert_eq!(header.layer, 0);
        assert_eq!(header.class_id, 0);
        assert_eq!(header.size as usize, bytes.len());

        let record = RecordHeader::parse(&bytes[8..]).unwrap();
        assert_eq!(record.class_id, 5);
        // 3 payload bytes padded to 4
        assert_eq!(record.size, 12);
    }

    #[test]
    fn test_event_nests_segments() {
        let mut builder = BlockBuilder::new();
        builder.event(7, |event| {
            event.segment(0x18, &[1, 2]);
        });
        let bytes = builder.finish();

        let event = RecordHeader::parse(&bytes[8..]).unwrap();
        assert_eq!(event.class_id, class::EVENT_HEADER);
        assert_eq!(event.size, 8 + 4 + 8 + 4 + 8);

        let segment = RecordHeader::parse(&bytes[20..]).unwrap();
        assert_eq!(segment.layer, 2);
        assert_eq!(segment.class_id, class::SEGMENT);
        assert_eq!(segment.size, 20);
    }
}
