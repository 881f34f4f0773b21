// src/types.rs
/// Which edge of a discriminator signal a timing measurement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeType {
    Leading,
    Trailing,
    #[default]
    Unknown,
}

impl EdgeType {
    /// Map the single edge bit of a TDC measurement word
    pub fn from_bit(bit: u32) -> Self {
        if bit == 0 {
            EdgeType::Leading
        } else {
            EdgeType::Trailing
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EdgeType::Leading => "leading",
            EdgeType::Trailing => "trailing",
            EdgeType::Unknown => "unknown",
        }
    }
}

/// One decoded module measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hit {
    pub geometry: u8,
    pub channel: u8,
    pub measure: u32,
    pub edge: EdgeType,
}

impl Hit {
    pub fn new(geometry: u8, channel: u8, measure: u32, edge: EdgeType) -> Self {
        Hit { geometry, channel, measure, edge }
    }
}

/// Loop control flags shared between the event store and its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionFlags(u32);

impl ConditionFlags {
    pub const STOP_EVENT: u32 = 1 << 0;
    pub const STOP_LOOP: u32 = 1 << 1;
    pub const END_OF_RUN: u32 = 1 << 2;

    pub fn new(flags: u32) -> Self {
        ConditionFlags(flags)
    }

    pub fn empty() -> Self {
        ConditionFlags(0)
    }

    pub fn is_stop_event(&self) -> bool {
        self.0 & Self::STOP_EVENT != 0
    }

    pub fn is_stop_loop(&self) -> bool {
        self.0 & Self::STOP_LOOP != 0
    }

    pub fn is_end_of_run(&self) -> bool {
        self.0 & Self::END_OF_RUN != 0
    }

    pub fn set(&mut self, flags: u32) {
        self.0 |= flags;
    }

    pub fn unset(&mut self, flags: u32) {
        self.0 &= !flags;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn raw_value(&self) -> u32 {
        self.0
    }
}
