//! Slot and request types for the simulated arena

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-assigned identifier of a request (e.g. `TK-1001`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new request ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What an occupied slot is holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Carries payload
    Data,
    /// Unused tail of a fixed-size reservation (standard mode)
    Waste,
    /// Unused tail of the last page (paged mode)
    Reserved,
}

impl Classification {
    /// Whether the slot is occupied without carrying payload
    pub fn is_slack(&self) -> bool {
        !matches!(self, Classification::Data)
    }
}

/// State of a single slot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SlotState {
    #[default]
    Free,
    Occupied {
        request_id: RequestId,
        classification: Classification,
    },
}

impl SlotState {
    pub fn is_free(&self) -> bool {
        matches!(self, SlotState::Free)
    }

    /// Owning request, if any
    pub fn owner(&self) -> Option<&RequestId> {
        match self {
            SlotState::Free => None,
            SlotState::Occupied { request_id, .. } => Some(request_id),
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            SlotState::Free => None,
            SlotState::Occupied { classification, .. } => Some(*classification),
        }
    }
}

/// A half-open run of slot indices `[start, start + len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: usize,
    pub len: usize,
}

impl SlotRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last index
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Collapse an ordered index list into maximal ascending runs.
    ///
    /// Order is preserved: `[4, 5, 0, 1]` becomes `[4..6, 0..2]`, so paged
    /// placements keep their selection order.
    pub fn coalesce(indices: &[usize]) -> Vec<SlotRange> {
        let mut ranges: Vec<SlotRange> = Vec::new();
        for &index in indices {
            match ranges.last_mut() {
                Some(last) if last.end() == index => last.len += 1,
                _ => ranges.push(SlotRange::new(index, 1)),
            }
        }
        ranges
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end())
    }
}

/// A request for admission into the arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    /// Number of slots actually carrying payload
    pub required_len: usize,
    /// Fixed-size units reserved in standard mode.
    ///
    /// `None` lets the standard allocator pick the minimum
    /// `ceil(required_len / unit_size)`. Ignored in paged mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_count: Option<usize>,
}

impl Request {
    pub fn new(id: impl Into<RequestId>, required_len: usize) -> Self {
        Self {
            id: id.into(),
            required_len,
            unit_count: None,
        }
    }

    /// Reserve an explicit number of units in standard mode
    pub fn with_units(mut self, unit_count: usize) -> Self {
        self.unit_count = Some(unit_count);
        self
    }
}
