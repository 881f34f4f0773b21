// src/dispatch/handlers.rs
use crate::block::RecordHeader;
use crate::dispatch::{ClassDispatchTable, DecodeContext};
use crate::mapping::HardwareKey;
use crate::output::{CategorizedHit, Segment, UnmappedPolicy};
use byteorder::{ByteOrder, LittleEndian};

/// Decode an event header record and the records nested inside it
pub(crate) fn decode_event(
    table: &ClassDispatchTable,
    record: &[u8],
    timestamped: bool,
    ctx: &mut DecodeContext<'_>,
    depth: usize,
) {
    let payload = &record[RecordHeader::SIZE..];
    let fixed = if timestamped { 12 } else { 4 };
    if payload.len() < fixed {
        tracing::warn!(size = record.len(), timestamped, "event record too short for its header");
        return;
    }

    ctx.segmented.event_number = Some(LittleEndian::read_u32(&payload[0..4]));
    if timestamped {
        ctx.segmented.timestamp = Some(LittleEndian::read_u64(&payload[4..12]));
    }

    if depth + 1 >= ClassDispatchTable::MAX_NESTING {
        tracing::warn!(depth, "records nested too deeply, skipping event contents");
        return;
    }

    let body = &payload[fixed..];
    let mut offset = 0;
    while offset < body.len() {
        offset = table.dispatch_nested(body, offset, ctx, depth + 1);
    }
}

/// Decode a segment record through the module decoder its ID selects
pub(crate) fn decode_segment(record: &[u8], ctx: &mut DecodeContext<'_>) {
    let payload = &record[RecordHeader::SIZE..];
    if payload.len() < 4 {
        tracing::warn!(size = record.len(), "segment record too short for its ID");
        return;
    }

    let segment_id = LittleEndian::read_u32(&payload[0..4]);
    let module_id = (segment_id & 0xff) as u8;
    let Some(decoder) = ctx.modules.get_mut(module_id) else {
        tracing::debug!(segment_id = format_args!("{:#010x}", segment_id), module_id, "no decoder for module");
        return;
    };

    let mut hits = Vec::new();
    decoder.decode(&payload[4..], &mut hits);

    if let Some(map) = ctx.map {
        for hit in &hits {
            let hardware = HardwareKey::for_hit(segment_id, hit.geometry, hit.channel);
            let logical = map.resolve(&hardware);
            if logical.is_none() && ctx.unmapped_policy == UnmappedPolicy::Drop {
                continue;
            }
            ctx.categorized.push(CategorizedHit {
                hardware,
                logical,
                hit: *hit,
            });
        }
    }

    ctx.segmented.push(Segment {
        segment_id,
        module_id,
        hits,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockBuilder;
    use crate::decoder::{ModuleRegistry, V1190Decoder};
    use crate::mapping::{ChannelMap, LogicalKey};
    use crate::output::{CategorizedData, SegmentedData};
    use crate::types::{EdgeType, Hit};

    const SEGMENT_ID: u32 = (1 << 20) | V1190Decoder::ID as u32;

    fn tdc_words() -> Vec<u32> {
        vec![
            V1190Decoder::GLOBAL_HEADER,
            V1190Decoder::TDC_HEADER | 3,
            V1190Decoder::CHANNEL.place(5) | 100,
            V1190Decoder::CHANNEL.place(6) | 200,
            V1190Decoder::TDC_TRAILER,
            V1190Decoder::GLOBAL_TRAILER,
        ]
    }

    fn run(builder: &BlockBuilder, map: Option<&ChannelMap>, policy: UnmappedPolicy) -> (SegmentedData, CategorizedData) {
        let bytes = builder.finish();
        let body = &bytes[RecordHeader::SIZE..];
        let mut segmented = SegmentedData::new();
        let mut categorized = CategorizedData::new();
        let mut modules = ModuleRegistry::with_defaults();
        let mut ctx = DecodeContext {
            segmented: &mut segmented,
            categorized: &mut categorized,
            modules: &mut modules,
            map,
            unmapped_policy: policy,
        };
        let table = ClassDispatchTable::new();
        let mut offset = 0;
        while offset < body.len() {
            offset = table.dispatch(body, offset, &mut ctx);
        }
        (segmented, categorized)
    }

    #[test]
    fn test_event_with_segment() {
        let mut builder = BlockBuilder::new();
        builder.event(42, |e| {
            e.segment(SEGMENT_ID, &tdc_words());
        });

        let (segmented, categorized) = run(&builder, None, UnmappedPolicy::Drop);
        assert_eq!(segmented.event_number, Some(42));
        assert_eq!(segmented.timestamp, None);
        let segment = segmented.segment(SEGMENT_ID).unwrap();
        assert_eq!(segment.module_id, 24);
        assert_eq!(segment.hits[0], Hit::new(3, 5, 100, EdgeType::Leading));
        // No map table, nothing categorized
        assert!(categorized.is_empty());
    }

    #[test]
    fn test_timestamped_event() {
        let mut builder = BlockBuilder::new();
        builder.timestamped_event(9, 0x0123_4567_89ab_cdef, |e| {
            e.segment(SEGMENT_ID, &tdc_words());
        });

        let (segmented, _) = run(&builder, None, UnmappedPolicy::Drop);
        assert_eq!(segmented.event_number, Some(9));
        assert_eq!(segmented.timestamp, Some(0x0123_4567_89ab_cdef));
        assert_eq!(segmented.hit_count(), 2);
    }

    #[test]
    fn test_unmapped_policy() {
        let map: ChannelMap = [(
            HardwareKey::new(1 << 20, 3, 5),
            LogicalKey::new(7, 1, 0),
        )]
        .into_iter()
        .collect();

        let mut builder = BlockBuilder::new();
        builder.segment(SEGMENT_ID, &tdc_words());

        let (_, dropped) = run(&builder, Some(&map), UnmappedPolicy::Drop);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped.hits()[0].logical, Some(LogicalKey::new(7, 1, 0)));

        let (_, passed) = run(&builder, Some(&map), UnmappedPolicy::PassThrough);
        assert_eq!(passed.len(), 2);
        assert_eq!(passed.unmapped().count(), 1);
        assert_eq!(passed.unmapped().next().unwrap().hardware, HardwareKey::new(1 << 20, 3, 6));
    }

    #[test]
    fn test_unknown_module_is_skipped() {
        let mut builder = BlockBuilder::new();
        builder.segment(0x0000_0063, &[1, 2, 3]);

        let (segmented, _) = run(&builder, None, UnmappedPolicy::Drop);
        assert!(segmented.is_empty());
    }
}
