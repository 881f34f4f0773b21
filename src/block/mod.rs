// src/block/mod.rs
mod header;
mod cursor;
mod builder;

pub use header::RecordHeader;
pub use cursor::{BlockCursor, RawBlock};
pub use builder::{BlockBuilder, EventBuilder};
