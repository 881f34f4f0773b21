// src/output.rs
//! Per-step output collections.
//!
//! Both collections are cleared at the start of every step and filled while
//! the step dispatches records. Anything a caller wants to keep past the next
//! step must be copied out.

use crate::mapping::{HardwareKey, LogicalKey};
use crate::types::Hit;

/// What to do with a hit whose hardware key is not in the map table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPolicy {
    #[default]
    Drop,
    PassThrough,
}

/// Decoded hits of one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segment_id: u32,
    pub module_id: u8,
    pub hits: Vec<Hit>,
}

/// Hits grouped by the segment they were read from
#[derive(Debug, Clone, Default)]
pub struct SegmentedData {
    pub event_number: Option<u32>,
    pub timestamp: Option<u64>,
    pub segments: Vec<Segment>,
}

impl SegmentedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.event_number = None;
        self.timestamp = None;
        self.segments.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segment(&self, segment_id: u32) -> Option<&Segment> {
        self.segments.iter().find(|s| s.segment_id == segment_id)
    }

    pub fn hit_count(&self) -> usize {
        self.segments.iter().map(|s| s.hits.len()).sum()
    }
}

/// A hit together with its hardware and (when mapped) logical address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorizedHit {
    pub hardware: HardwareKey,
    pub logical: Option<LogicalKey>,
    pub hit: Hit,
}

/// Hits resolved through the map table
#[derive(Debug, Clone, Default)]
pub struct CategorizedData {
    hits: Vec<CategorizedHit>,
}

impl CategorizedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn push(&mut self, hit: CategorizedHit) {
        self.hits.push(hit);
    }

    pub fn hits(&self) -> &[CategorizedHit] {
        &self.hits
    }

    pub fn by_category(&self, category_id: i32) -> impl Iterator<Item = &CategorizedHit> {
        self.hits
            .iter()
            .filter(move |h| h.logical.is_some_and(|l| l.category_id == category_id))
    }

    pub fn unmapped(&self) -> impl Iterator<Item = &CategorizedHit> {
        self.hits.iter().filter(|h| h.logical.is_none())
    }
}
