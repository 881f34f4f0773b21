// src/dispatch/table.rs
use crate::block::RecordHeader;
use crate::decoder::ModuleRegistry;
use crate::dispatch::{class, handlers};
use crate::error::{Result, RidfError};
use crate::mapping::ChannelMap;
use crate::output::{CategorizedData, SegmentedData, UnmappedPolicy};

/// How records of one class are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassHandler {
    /// No handler registered; the record is skipped and reported
    Unregistered,
    /// Known class whose contents are not needed
    Skip,
    EventHeader,
    TimestampedEventHeader,
    Segment,
}

/// Everything a handler may write to or consult while decoding a record
pub struct DecodeContext<'a> {
    pub segmented: &'a mut SegmentedData,
    pub categorized: &'a mut CategorizedData,
    pub modules: &'a mut ModuleRegistry,
    pub map: Option<&'a ChannelMap>,
    pub unmapped_policy: UnmappedPolicy,
}

/// Fixed table from class ID to [`ClassHandler`].
///
/// Every dispatch advances the offset by exactly the size declared in the
/// record header, whatever the handler does with the contents. Records
/// whose declared size cannot be honoured end the parse of the enclosing
/// buffer instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDispatchTable {
    handlers: [ClassHandler; Self::SIZE],
}

impl ClassDispatchTable {
    pub const SIZE: usize = 16;
    /// Deepest level of records nested inside event records
    pub const MAX_NESTING: usize = 8;

    /// A table where every class is unregistered
    pub fn empty() -> Self {
        ClassDispatchTable {
            handlers: [ClassHandler::Unregistered; Self::SIZE],
        }
    }

    /// The standard RIDF registrations
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.handlers[class::EVENT_HEADER as usize] = ClassHandler::EventHeader;
        table.handlers[class::SEGMENT as usize] = ClassHandler::Segment;
        table.handlers[class::TIMESTAMPED_EVENT_HEADER as usize] = ClassHandler::TimestampedEventHeader;
        for id in [
            class::COMMENT,
            class::BLOCK_NUMBER,
            class::END_OF_BLOCK,
            class::SCALER,
            class::NON_CLEAR_SCALER,
            class::STATUS_SCALER,
        ] {
            table.handlers[id as usize] = ClassHandler::Skip;
        }
        table
    }

    /// Bind `handler` to `class_id`, returning the handler it replaces
    pub fn register(&mut self, class_id: u8, handler: ClassHandler) -> Result<ClassHandler> {
        let slot = self
            .handlers
            .get_mut(class_id as usize)
            .ok_or(RidfError::InvalidClassId(class_id))?;
        Ok(std::mem::replace(slot, handler))
    }

    /// Handler for `class_id`; IDs beyond the table fall back to [`ClassHandler::Unregistered`]
    pub fn handler(&self, class_id: u8) -> ClassHandler {
        self.handlers
            .get(class_id as usize)
            .copied()
            .unwrap_or(ClassHandler::Unregistered)
    }

    /// Decode the record starting at `offset` in `data` and return the offset
    /// of the next record.
    pub fn dispatch(&self, data: &[u8], offset: usize, ctx: &mut DecodeContext<'_>) -> usize {
        self.dispatch_nested(data, offset, ctx, 0)
    }

    pub(crate) fn dispatch_nested(
        &self,
        data: &[u8],
        offset: usize,
        ctx: &mut DecodeContext<'_>,
        depth: usize,
    ) -> usize {
        let rest = data.get(offset..).unwrap_or_default();
        let Some(header) = RecordHeader::parse(rest) else {
            tracing::warn!(offset, remaining = rest.len(), "truncated record header, skipping to end of buffer");
            return data.len();
        };

        let size = header.size as usize;
        if size < RecordHeader::SIZE || size > rest.len() {
            tracing::warn!(
                offset,
                class_id = header.class_id,
                size,
                remaining = rest.len(),
                "record size does not fit its buffer, skipping to end of buffer"
            );
            return data.len();
        }

        let record = &rest[..size];
        let handler = self.handler(header.class_id);
        tracing::trace!(offset, class_id = header.class_id, size, ?handler, "dispatch record");

        match handler {
            ClassHandler::Unregistered => {
                tracing::debug!(class_id = header.class_id, size, "skipping record of unknown class");
            }
            ClassHandler::Skip => {}
            ClassHandler::EventHeader => handlers::decode_event(self, record, false, ctx, depth),
            ClassHandler::TimestampedEventHeader => handlers::decode_event(self, record, true, ctx, depth),
            ClassHandler::Segment => handlers::decode_segment(record, ctx),
        }

        offset + size
    }
}

impl Default for ClassDispatchTable {
    fn default() -> Self {
        Self::new()
    }
}
