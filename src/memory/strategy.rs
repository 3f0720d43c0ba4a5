//! Allocation strategy dispatch

use super::arena::SlotArena;
use super::paged::PagedAllocator;
use super::selector::PageSelector;
use super::slot::{Classification, Request};
use super::standard::StandardAllocator;
use crate::error::AllocationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which allocator is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Fixed-size contiguous reservation per request
    Standard,
    /// Variable-size allocation from scattered pages
    #[default]
    Paged,
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationMode::Standard => f.write_str("standard"),
            AllocationMode::Paged => f.write_str("paged"),
        }
    }
}

impl FromStr for AllocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "static" => Ok(AllocationMode::Standard),
            "paged" | "dynamic" => Ok(AllocationMode::Paged),
            other => Err(format!("unknown allocation mode: {}", other)),
        }
    }
}

/// Slots chosen for one request, with their classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub slots: Vec<usize>,
    pub classifications: Vec<Classification>,
}

impl Placement {
    /// Number of placed slots with the given classification
    pub fn count(&self, classification: Classification) -> usize {
        self.classifications
            .iter()
            .filter(|&&c| c == classification)
            .count()
    }
}

/// The active allocator
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    Standard(StandardAllocator),
    Paged(PagedAllocator),
}

impl Strategy {
    pub fn for_mode(mode: AllocationMode, unit_size: usize, page_size: usize) -> Self {
        match mode {
            AllocationMode::Standard => Strategy::Standard(StandardAllocator::new(unit_size)),
            AllocationMode::Paged => Strategy::Paged(PagedAllocator::new(page_size)),
        }
    }

    pub fn mode(&self) -> AllocationMode {
        match self {
            Strategy::Standard(_) => AllocationMode::Standard,
            Strategy::Paged(_) => AllocationMode::Paged,
        }
    }

    /// Validate `request` and fix its mode parameters
    pub fn prepare(&self, request: Request) -> Result<Request, AllocationError> {
        match self {
            Strategy::Standard(alloc) => alloc.prepare(request),
            Strategy::Paged(alloc) => alloc.prepare(request),
        }
    }

    /// Slots a prepared request occupies once placed, `None` on overflow
    pub fn footprint(&self, request: &Request) -> Option<usize> {
        match self {
            Strategy::Standard(alloc) => alloc.footprint(request),
            Strategy::Paged(alloc) => alloc.footprint(request),
        }
    }

    /// Try to place a prepared request against the current arena
    pub fn place(
        &self,
        arena: &SlotArena,
        request: &Request,
        selector: &mut dyn PageSelector,
    ) -> Result<Placement, AllocationError> {
        match self {
            Strategy::Standard(alloc) => alloc.place(arena, request),
            Strategy::Paged(alloc) => alloc.place(arena, request, selector),
        }
    }
}
