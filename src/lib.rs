// src/lib.rs
//! # ridf-rs
//!
//! A streaming decoder for RIDF (RIKEN Integrated Data Format) event data, the
//! block-structured format written by the RIBF data-acquisition system.
//!
//! ## Features
//!
//! - **Step-driven**: one bounded step per call, one decoded event per step
//! - **Robust framing**: every record advances the parse position by its
//!   declared size, known or not, so damaged or unknown records never corrupt
//!   what follows
//! - **Module decoders**: V1190 multihit TDC and V7XX ADC/TDC word formats,
//!   selected by the module ID of each segment
//! - **Channel mapping**: hardware addresses resolved to
//!   `(category, detector, slot)` through a table loaded from map files
//! - **Finite and live sources**: ordered file lists, in-memory streams,
//!   memory-mapped files and channel-fed online buffers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ridf_rs::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = EventStoreConfig::new()
//!         .with_inputs(["run0001.ridf", "run0002.ridf"])
//!         .with_map_config("conf/mapper.conf");
//!
//!     let mut store = EventStore::new(config);
//!     let mut collection = EventCollection::new();
//!     store.init(&mut collection)?;
//!
//!     let catdata = collection.categorized("catdata").unwrap();
//!     let condition = collection.condition();
//!
//!     while !condition.get().is_end_of_run() {
//!         condition.unset(ConditionFlags::STOP_EVENT);
//!         store.process();
//!         if condition.get().is_stop_event() {
//!             continue;
//!         }
//!         for hit in catdata.lock().by_category(1) {
//!             println!("{:?} -> {}", hit.logical, hit.hit.measure);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Live Data
//!
//! ```rust
//! use ridf_rs::prelude::*;
//! use ridf_rs::block::BlockBuilder;
//! use ridf_rs::source::{LiveSource, SourceDescriptor};
//!
//! let (feed, live) = LiveSource::channel();
//! let mut store = EventStore::new(EventStoreConfig::new())
//!     .with_source(SourceDescriptor::Stream(Box::new(live)));
//!
//! // Nothing published yet
//! assert_eq!(store.process(), StepOutcome::NotReady);
//!
//! let mut block = BlockBuilder::new();
//! block.segment(0x18, &[0x4000_0000, 0x0800_0001, 0x0028_0064, 0x1800_0000, 0x8000_0000]);
//! feed.publish(block.finish());
//!
//! assert_eq!(store.process(), StepOutcome::Event);
//! ```

// Modules
pub mod error;
pub mod types;
pub mod bitfield;
pub mod block;
pub mod mapping;
pub mod decoder;
pub mod dispatch;
pub mod output;
pub mod source;
pub mod store;

// Re-export commonly used types at the crate root for convenience
pub use error::{RidfError, Result};

pub use types::{
    ConditionFlags,
    EdgeType,
    Hit,
};

pub use bitfield::BitField;

pub use block::{
    BlockBuilder,
    RecordHeader,
};

pub use mapping::{
    ChannelMap,
    HardwareKey,
    LogicalKey,
};

pub use decoder::{
    ModuleDecoder,
    ModuleRegistry,
    V1190Decoder,
    V7xxDecoder,
};

pub use dispatch::{
    ClassDispatchTable,
    ClassHandler,
};

pub use output::{
    CategorizedData,
    CategorizedHit,
    Segment,
    SegmentedData,
    UnmappedPolicy,
};

pub use source::{
    DataSource,
    LiveSource,
    SourceDescriptor,
    StreamSource,
};

pub use store::{
    EventCollection,
    EventStore,
    EventStoreConfig,
    Processor,
    StepOutcome,
};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use ridf_rs::prelude::*;
    //! ```

    pub use crate::error::{RidfError, Result};
    pub use crate::types::{ConditionFlags, EdgeType, Hit};
    pub use crate::mapping::{ChannelMap, HardwareKey, LogicalKey};
    pub use crate::store::{EventCollection, EventStore, EventStoreConfig, Processor, StepOutcome};
}

/// Size of every RIDF block and record header in bytes
pub const HEADER_SIZE: usize = RecordHeader::SIZE;

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
