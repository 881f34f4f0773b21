// src/store/collection.rs
use crate::error::{Result, RidfError};
use crate::output::{CategorizedData, SegmentedData};
use crate::types::ConditionFlags;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Loop control flags shared by every processor of one loop
#[derive(Debug, Clone, Default)]
pub struct Condition {
    flags: Arc<Mutex<ConditionFlags>>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, flags: u32) {
        self.flags.lock().set(flags);
    }

    pub fn unset(&self, flags: u32) {
        self.flags.lock().unset(flags);
    }

    pub fn clear(&self) {
        *self.flags.lock() = ConditionFlags::empty();
    }

    pub fn get(&self) -> ConditionFlags {
        *self.flags.lock()
    }
}

/// A named output registered by a processor
#[derive(Debug, Clone)]
pub enum Output {
    Segmented(Arc<Mutex<SegmentedData>>),
    Categorized(Arc<Mutex<CategorizedData>>),
}

/// Named outputs and the shared condition of one processing loop
#[derive(Debug, Default)]
pub struct EventCollection {
    condition: Condition,
    outputs: HashMap<String, Output>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(&self) -> Condition {
        self.condition.clone()
    }

    pub fn add(&mut self, name: impl Into<String>, output: Output) -> Result<()> {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            return Err(RidfError::DuplicateOutput(name));
        }
        self.outputs.insert(name, output);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn segmented(&self, name: &str) -> Option<Arc<Mutex<SegmentedData>>> {
        match self.outputs.get(name) {
            Some(Output::Segmented(data)) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    pub fn categorized(&self, name: &str) -> Option<Arc<Mutex<CategorizedData>>> {
        match self.outputs.get(name) {
            Some(Output::Categorized(data)) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

/// One step of work driven by an external scheduler
pub trait Processor {
    /// Register outputs and pick up the shared condition
    fn init(&mut self, collection: &mut EventCollection) -> Result<()>;

    /// Perform one bounded step
    fn process(&mut self) -> crate::store::StepOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_is_shared() {
        let collection = EventCollection::new();
        let a = collection.condition();
        let b = collection.condition();

        a.set(ConditionFlags::STOP_LOOP);
        assert!(b.get().is_stop_loop());

        b.clear();
        assert!(a.get().is_empty());
    }

    #[test]
    fn test_duplicate_output_name() {
        let mut collection = EventCollection::new();
        let data = Arc::new(Mutex::new(SegmentedData::new()));
        collection.add("segdata", Output::Segmented(data.clone())).unwrap();

        assert!(matches!(
            collection.add("segdata", Output::Segmented(data)),
            Err(RidfError::DuplicateOutput(name)) if name == "segdata"
        ));
        assert!(collection.segmented("segdata").is_some());
        assert!(collection.categorized("segdata").is_none());
        assert_eq!(collection.names().count(), 1);
    }
}
