// src/store/config.rs
use crate::output::UnmappedPolicy;
use std::path::PathBuf;

/// Construction parameters of an [`EventStore`](crate::store::EventStore)
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Files consumed in order, one after the other
    pub input_files: Vec<PathBuf>,
    /// Primary map configuration; no categorization when `None`
    pub map_config: Option<PathBuf>,
    pub segmented_name: String,
    pub categorized_name: String,
    pub unmapped_policy: UnmappedPolicy,
    /// Initial capacity of the block buffer in bytes
    pub block_capacity: usize,
}

impl EventStoreConfig {
    pub const DEFAULT_SEGMENTED_NAME: &'static str = "segdata";
    pub const DEFAULT_CATEGORIZED_NAME: &'static str = "catdata";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_files.push(path.into());
        self
    }

    pub fn with_inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.input_files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_map_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.map_config = Some(path.into());
        self
    }

    pub fn with_output_names(mut self, segmented: impl Into<String>, categorized: impl Into<String>) -> Self {
        self.segmented_name = segmented.into();
        self.categorized_name = categorized.into();
        self
    }

    pub fn with_unmapped_policy(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped_policy = policy;
        self
    }

    pub fn with_block_capacity(mut self, capacity: usize) -> Self {
        self.block_capacity = capacity;
        self
    }
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        EventStoreConfig {
            input_files: Vec::new(),
            map_config: None,
            segmented_name: Self::DEFAULT_SEGMENTED_NAME.to_string(),
            categorized_name: Self::DEFAULT_CATEGORIZED_NAME.to_string(),
            unmapped_policy: UnmappedPolicy::Drop,
            block_capacity: 1 << 20,
        }
    }
}
