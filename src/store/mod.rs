// src/store/mod.rs
mod config;
mod collection;
mod event_store;

pub use config::EventStoreConfig;
pub use collection::{Condition, EventCollection, Output, Processor};
pub use event_store::{EventStore, EventStoreState, ReaderPhase, StepOutcome, StoreStats};
