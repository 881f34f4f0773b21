// src/mapping/mod.rs
mod keys;
mod config_file;
mod channel_map;

pub use keys::{HardwareKey, LogicalKey};
pub use config_file::{ConfigTokenizer, Token};
pub use channel_map::ChannelMap;
