// src/store/event_store.rs
use crate::block::{BlockCursor, RawBlock, RecordHeader};
use crate::decoder::{ModuleDecoder, ModuleRegistry};
use crate::dispatch::{ClassDispatchTable, DecodeContext};
use crate::error::Result;
use crate::mapping::ChannelMap;
use crate::output::{CategorizedData, SegmentedData};
use crate::source::{DataSource, SourceDescriptor};
use crate::store::collection::{Condition, EventCollection, Output, Processor};
use crate::store::EventStoreConfig;
use crate::types::ConditionFlags;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Result of one [`EventStore::process`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The outputs hold one decoded event
    Event,
    /// The block header was rejected; the next step reads a new header
    NoProgress,
    /// The current source has no data yet; nothing was changed
    NotReady,
    /// The current source ended and was closed
    SourceClosed,
    /// The block was used up without producing an event
    EndOfBlock,
    /// No source is left; the end-of-run condition was raised
    EndOfRun,
    /// The run already ended
    Finished,
}

/// Position of the framing state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderPhase {
    /// No open source
    SourceExhausted,
    /// A source is open but no unread block is buffered
    NeedBlock,
    /// Records remain in the buffered block
    InBlock,
}

/// Snapshot of the framing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStoreState {
    pub phase: ReaderPhase,
    pub offset: usize,
    pub block_size: usize,
    pub is_block_exhausted: bool,
    pub has_block: bool,
    pub pending_sources: usize,
}

/// Running counters, never reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub blocks_read: u64,
    pub events: u64,
    pub invalid_headers: u64,
    pub sources_opened: u64,
    pub sources_closed: u64,
}

enum BlockRead {
    Loaded,
    Empty,
    Invalid,
    Ended,
}

/// Decodes RIDF blocks from a queue of sources, one event per step.
///
/// Every call to [`process`](Self::process) clears both outputs, reads at
/// most one block and dispatches records until an event has been produced
/// or the block is used up. Records left in the block wait for the next
/// step. Sources are opened in order and closed as soon as they end; when
/// none is left the shared condition receives stop-event, stop-loop and
/// end-of-run, once.
///
/// # Example
///
/// ```no_run
/// use ridf_rs::prelude::*;
///
/// fn main() -> Result<()> {
///     let config = EventStoreConfig::new()
///         .with_input("run0001.ridf")
///         .with_map_config("conf/mapper.conf");
///
///     let mut store = EventStore::new(config);
///     let mut collection = EventCollection::new();
///     store.init(&mut collection)?;
///
///     let segdata = collection.segmented("segdata").unwrap();
///     loop {
///         match store.process() {
///             StepOutcome::Event => println!("{} hits", segdata.lock().hit_count()),
///             StepOutcome::EndOfRun => break,
///             _ => {}
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct EventStore {
    config: EventStoreConfig,
    pending: VecDeque<SourceDescriptor>,
    source: Option<Box<dyn DataSource + Send>>,
    cursor: BlockCursor,
    spare: Vec<u8>,
    table: ClassDispatchTable,
    modules: ModuleRegistry,
    map: Option<Arc<ChannelMap>>,
    segmented: Arc<Mutex<SegmentedData>>,
    categorized: Arc<Mutex<CategorizedData>>,
    condition: Condition,
    finished: bool,
    stats: StoreStats,
}

impl EventStore {
    pub fn new(config: EventStoreConfig) -> Self {
        let pending = config
            .input_files
            .iter()
            .cloned()
            .map(SourceDescriptor::File)
            .collect();

        EventStore {
            spare: Vec::with_capacity(config.block_capacity),
            config,
            pending,
            source: None,
            cursor: BlockCursor::new(),
            table: ClassDispatchTable::new(),
            modules: ModuleRegistry::with_defaults(),
            map: None,
            segmented: Arc::new(Mutex::new(SegmentedData::new())),
            categorized: Arc::new(Mutex::new(CategorizedData::new())),
            condition: Condition::new(),
            finished: false,
            stats: StoreStats::default(),
        }
    }

    /// Queue a source behind the configured input files
    pub fn push_source(&mut self, source: SourceDescriptor) {
        self.pending.push_back(source);
    }

    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.push_source(source);
        self
    }

    pub fn with_dispatch_table(mut self, table: ClassDispatchTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_modules(mut self, modules: ModuleRegistry) -> Self {
        self.modules = modules;
        self
    }

    pub fn register_module(&mut self, decoder: Box<dyn ModuleDecoder>) {
        self.modules.register(decoder);
    }

    /// Swap in a new map table. Takes effect from the next step.
    pub fn replace_map(&mut self, map: Arc<ChannelMap>) {
        self.map = Some(map);
    }

    pub fn map(&self) -> Option<&Arc<ChannelMap>> {
        self.map.as_ref()
    }

    pub fn segmented(&self) -> Arc<Mutex<SegmentedData>> {
        Arc::clone(&self.segmented)
    }

    pub fn categorized(&self) -> Arc<Mutex<CategorizedData>> {
        Arc::clone(&self.categorized)
    }

    pub fn condition(&self) -> Condition {
        self.condition.clone()
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn state(&self) -> EventStoreState {
        let phase = if self.source.is_none() {
            ReaderPhase::SourceExhausted
        } else if self.cursor.is_exhausted() {
            ReaderPhase::NeedBlock
        } else {
            ReaderPhase::InBlock
        };

        EventStoreState {
            phase,
            offset: self.cursor.offset(),
            block_size: self.cursor.block_size(),
            is_block_exhausted: self.cursor.is_exhausted(),
            has_block: self.cursor.block().is_some(),
            pending_sources: self.pending.len(),
        }
    }

    /// Register outputs, adopt the collection's condition and load the map
    /// table. A map configuration error aborts initialization.
    pub fn init(&mut self, collection: &mut EventCollection) -> Result<()> {
        if self.map.is_none() {
            if let Some(path) = &self.config.map_config {
                self.map = Some(Arc::new(ChannelMap::load(path)?));
            }
        }

        collection.add(
            self.config.segmented_name.clone(),
            Output::Segmented(Arc::clone(&self.segmented)),
        )?;
        collection.add(
            self.config.categorized_name.clone(),
            Output::Categorized(Arc::clone(&self.categorized)),
        )?;
        self.condition = collection.condition();

        for source in &self.pending {
            tracing::info!(source = %source, "queued input");
        }
        Ok(())
    }

    /// Perform one step. See [`StepOutcome`] for what each result means.
    pub fn process(&mut self) -> StepOutcome {
        self.segmented.lock().clear();
        self.categorized.lock().clear();

        if self.finished {
            return StepOutcome::Finished;
        }

        if self.source.is_none() && !self.open_next_source() {
            tracing::info!(
                blocks = self.stats.blocks_read,
                events = self.stats.events,
                "no more input, end of run"
            );
            self.condition.set(ConditionFlags::STOP_EVENT | ConditionFlags::STOP_LOOP | ConditionFlags::END_OF_RUN);
            self.finished = true;
            return StepOutcome::EndOfRun;
        }

        if self.cursor.is_exhausted() {
            let prepared = self.source.as_mut().is_some_and(|source| source.is_prepared());
            if !prepared {
                return StepOutcome::NotReady;
            }

            match self.read_block() {
                BlockRead::Loaded => {}
                BlockRead::Empty => {
                    self.condition.set(ConditionFlags::STOP_EVENT);
                    return StepOutcome::EndOfBlock;
                }
                BlockRead::Invalid => {
                    self.condition.set(ConditionFlags::STOP_EVENT);
                    return StepOutcome::NoProgress;
                }
                BlockRead::Ended => {
                    self.close_source();
                    self.condition.set(ConditionFlags::STOP_EVENT);
                    return StepOutcome::SourceClosed;
                }
            }
        }

        let outcome = self.dispatch_block();
        match outcome {
            StepOutcome::Event => self.stats.events += 1,
            _ => self.condition.set(ConditionFlags::STOP_EVENT),
        }
        outcome
    }

    fn dispatch_block(&mut self) -> StepOutcome {
        let mut segmented = self.segmented.lock();
        let mut categorized = self.categorized.lock();
        let mut ctx = DecodeContext {
            segmented: &mut segmented,
            categorized: &mut categorized,
            modules: &mut self.modules,
            map: self.map.as_deref(),
            unmapped_policy: self.config.unmapped_policy,
        };

        loop {
            let Some((data, offset)) = self.cursor.remaining() else {
                return StepOutcome::EndOfBlock;
            };
            let next = self.table.dispatch(data, offset, &mut ctx);
            self.cursor.advance_to(next);

            if !ctx.segmented.is_empty() || !ctx.categorized.is_empty() {
                return StepOutcome::Event;
            }
            if self.cursor.is_exhausted() {
                return StepOutcome::EndOfBlock;
            }
        }
    }

    fn open_next_source(&mut self) -> bool {
        while let Some(descriptor) = self.pending.pop_front() {
            let name = descriptor.to_string();
            match descriptor.open() {
                Ok(source) => {
                    tracing::info!(source = %name, "opened input");
                    self.source = Some(source);
                    self.stats.sources_opened += 1;
                    return true;
                }
                Err(e) => {
                    tracing::error!(source = %name, error = %e, "cannot open input, skipping");
                }
            }
        }
        false
    }

    fn close_source(&mut self) {
        if self.source.take().is_some() {
            self.stats.sources_closed += 1;
            tracing::info!(blocks = self.stats.blocks_read, "input drained, closing source");
        }
        self.cursor.reset();
    }

    fn read_block(&mut self) -> BlockRead {
        let Some(source) = self.source.as_mut() else {
            return BlockRead::Ended;
        };

        let mut header_bytes = [0u8; RecordHeader::SIZE];
        match source.read(&mut header_bytes) {
            Ok(true) => {}
            Ok(false) => return BlockRead::Ended,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read block header");
                return BlockRead::Ended;
            }
        }

        let Some(header) = RecordHeader::parse(&header_bytes) else {
            return BlockRead::Ended;
        };
        if !header.is_valid_block_header() {
            self.stats.invalid_headers += 1;
            tracing::warn!(
                layer = header.layer,
                class_id = header.class_id,
                size = header.size,
                "invalid block header"
            );
            return BlockRead::Invalid;
        }

        let mut data = match self.cursor.take_buffer() {
            Some(buffer) => buffer,
            None => std::mem::take(&mut self.spare),
        };
        data.clear();
        data.resize(header.payload_len(), 0);

        match source.read(&mut data) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(size = data.len(), "short block read, discarding header");
                self.spare = data;
                return BlockRead::Ended;
            }
            Err(e) => {
                tracing::warn!(error = %e, size = data.len(), "failed to read block body");
                self.spare = data;
                return BlockRead::Ended;
            }
        }

        self.stats.blocks_read += 1;
        let empty = data.is_empty();
        self.cursor.load(RawBlock { header, data });
        if empty {
            BlockRead::Empty
        } else {
            BlockRead::Loaded
        }
    }
}

impl Processor for EventStore {
    fn init(&mut self, collection: &mut EventCollection) -> Result<()> {
        EventStore::init(self, collection)
    }

    fn process(&mut self) -> StepOutcome {
        EventStore::process(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockBuilder;
    use crate::decoder::V1190Decoder;
    use crate::source::{LiveSource, StreamSource};
    use crate::test_helpers::v1190_single_hit;
    use std::io::Cursor;

    const SEGMENT_ID: u32 = V1190Decoder::ID as u32;

    fn tdc_words(channel: u32) -> Vec<u32> {
        v1190_single_hit(1, channel, 10)
    }

    fn stream(bytes: Vec<u8>) -> SourceDescriptor {
        SourceDescriptor::Stream(Box::new(StreamSource::from_reader(Cursor::new(bytes))))
    }

    fn store_with(bytes: Vec<u8>) -> EventStore {
        EventStore::new(EventStoreConfig::new()).with_source(stream(bytes))
    }

    #[test]
    fn test_one_event_per_step() {
        let mut builder = BlockBuilder::new();
        for n in 0..3 {
            builder.event(n, |e| {
                e.segment(SEGMENT_ID, &tdc_words(n));
            });
        }
        let mut store = store_with(builder.finish().to_vec());
        let segdata = store.segmented();

        for n in 0..3u32 {
            assert_eq!(store.process(), StepOutcome::Event);
            let data = segdata.lock();
            assert_eq!(data.event_number, Some(n));
            assert_eq!(data.segments[0].hits[0].channel as u32, n);
        }
        assert!(store.state().is_block_exhausted);
        assert_eq!(store.state().phase, ReaderPhase::NeedBlock);

        assert_eq!(store.process(), StepOutcome::SourceClosed);
        assert!(segdata.lock().is_empty());
        assert_eq!(store.process(), StepOutcome::EndOfRun);
        assert_eq!(store.process(), StepOutcome::Finished);

        let stats = store.stats();
        assert_eq!(stats.events, 3);
        assert_eq!(stats.blocks_read, 1);
        assert_eq!(stats.sources_closed, 1);
    }

    #[test]
    fn test_skip_only_block_consumes_declared_sizes() {
        let mut builder = BlockBuilder::new();
        builder.record(5, &[0; 6]).record(7, &[0; 2]).record(11, &[0; 20]);
        let declared: usize = [14, 10, 28].iter().sum();
        let mut store = store_with(builder.finish().to_vec());

        assert_eq!(store.process(), StepOutcome::EndOfBlock);
        let state = store.state();
        assert_eq!(state.offset, declared);
        assert_eq!(state.block_size, declared);
        assert!(state.is_block_exhausted);
        assert!(store.condition().get().is_stop_event());
    }

    #[test]
    fn test_invalid_header_makes_no_progress() {
        let mut bytes = BlockBuilder::with_class(7).finish().to_vec();
        let mut good = BlockBuilder::new();
        good.segment(SEGMENT_ID, &tdc_words(2));
        bytes.extend_from_slice(&good.finish());

        let mut store = store_with(bytes);
        assert_eq!(store.process(), StepOutcome::NoProgress);
        assert_eq!(store.state().phase, ReaderPhase::NeedBlock);
        assert_eq!(store.stats().invalid_headers, 1);

        assert_eq!(store.process(), StepOutcome::Event);
    }

    #[test]
    fn test_short_block_closes_source() {
        let mut builder = BlockBuilder::new();
        builder.segment(SEGMENT_ID, &tdc_words(0));
        let mut bytes = builder.finish().to_vec();
        bytes.truncate(bytes.len() - 4);

        let mut store = store_with(bytes);
        assert_eq!(store.process(), StepOutcome::SourceClosed);
        let state = store.state();
        assert_eq!(state.phase, ReaderPhase::SourceExhausted);
        assert!(!state.has_block);
        assert_eq!(store.process(), StepOutcome::EndOfRun);
    }

    #[test]
    fn test_empty_block() {
        let mut bytes = BlockBuilder::new().finish().to_vec();
        let mut builder = BlockBuilder::new();
        builder.segment(SEGMENT_ID, &tdc_words(0));
        bytes.extend_from_slice(&builder.finish());

        let mut store = store_with(bytes);
        assert_eq!(store.process(), StepOutcome::EndOfBlock);
        assert_eq!(store.process(), StepOutcome::Event);
    }

    #[test]
    fn test_not_prepared_leaves_state_alone() {
        let (feed, live) = LiveSource::channel();
        let mut store = EventStore::new(EventStoreConfig::new())
            .with_source(SourceDescriptor::Stream(Box::new(live)));

        assert_eq!(store.process(), StepOutcome::NotReady);
        let before = store.state();
        assert_eq!(store.process(), StepOutcome::NotReady);
        assert_eq!(store.state(), before);
        assert!(store.condition().get().is_empty());

        let mut builder = BlockBuilder::new();
        builder.segment(SEGMENT_ID, &tdc_words(4));
        feed.publish(builder.finish());
        assert_eq!(store.process(), StepOutcome::Event);

        drop(feed);
        assert_eq!(store.process(), StepOutcome::SourceClosed);
        assert_eq!(store.process(), StepOutcome::EndOfRun);
    }

    #[test]
    fn test_outputs_cleared_each_step() {
        let mut builder = BlockBuilder::new();
        builder.segment(SEGMENT_ID, &tdc_words(1));
        builder.record(5, &[0; 4]);
        let mut store = store_with(builder.finish().to_vec());
        let segdata = store.segmented();

        assert_eq!(store.process(), StepOutcome::Event);
        assert_eq!(segdata.lock().len(), 1);
        assert_eq!(store.process(), StepOutcome::EndOfBlock);
        assert!(segdata.lock().is_empty());
    }
}
