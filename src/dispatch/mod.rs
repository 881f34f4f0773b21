// src/dispatch/mod.rs
mod table;
mod handlers;

pub use table::{ClassDispatchTable, ClassHandler, DecodeContext};

/// Record class IDs with a registered meaning
pub mod class {
    pub const EVENT_HEADER: u8 = 3;
    pub const SEGMENT: u8 = 4;
    pub const COMMENT: u8 = 5;
    pub const TIMESTAMPED_EVENT_HEADER: u8 = 6;
    pub const BLOCK_NUMBER: u8 = 8;
    pub const END_OF_BLOCK: u8 = 9;
    pub const SCALER: u8 = 11;
    pub const NON_CLEAR_SCALER: u8 = 12;
    pub const STATUS_SCALER: u8 = 13;
}
