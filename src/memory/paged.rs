//! Dynamic page allocator
//!
//! Requests take `ceil(required_len / page_size)` pages chosen from
//! anywhere in the arena. Only the last page can carry slack, so the
//! reserved tail is always shorter than one page.

use super::arena::SlotArena;
use super::selector::PageSelector;
use super::slot::{Classification, Request};
use super::strategy::Placement;
use crate::error::AllocationError;
use tracing::debug;

/// Page allocator with pluggable page choice
#[derive(Debug, Clone, Copy)]
pub struct PagedAllocator {
    /// Slots per page
    pub page_size: usize,
}

impl PagedAllocator {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn pages_needed(&self, required_len: usize) -> usize {
        required_len.div_ceil(self.page_size)
    }

    /// Paged mode ignores unit counts
    pub fn prepare(&self, mut request: Request) -> Result<Request, AllocationError> {
        if request.required_len == 0 {
            return Err(AllocationError::InvalidRequest(format!(
                "request {} has zero length",
                request.id
            )));
        }
        request.unit_count = None;
        Ok(request)
    }

    /// Slots taken by whole pages, `None` if the count overflows
    pub fn footprint(&self, request: &Request) -> Option<usize> {
        self.pages_needed(request.required_len)
            .checked_mul(self.page_size)
    }

    /// Start index of every free page, ascending.
    ///
    /// Pages are always taken and released whole, so the first slot
    /// stands in for the page.
    pub fn free_pages(&self, arena: &SlotArena) -> Vec<usize> {
        (0..arena.total_slots())
            .step_by(self.page_size)
            .filter(|&start| arena.state(start).is_some_and(|s| s.is_free()))
            .collect()
    }

    /// Pick pages for `request` through `selector` and classify them
    pub fn place(
        &self,
        arena: &SlotArena,
        request: &Request,
        selector: &mut dyn PageSelector,
    ) -> Result<Placement, AllocationError> {
        let needed = self.pages_needed(request.required_len);
        let candidates = self.free_pages(arena);
        if candidates.len() < needed {
            return Err(AllocationError::InsufficientPages {
                needed,
                available: candidates.len(),
            });
        }

        let pages = selector.choose(&candidates, needed);
        assert_eq!(pages.len(), needed, "selector returned the wrong page count");

        let slots: Vec<usize> = pages
            .iter()
            .flat_map(|&start| start..start + self.page_size)
            .collect();
        let classifications = (0..slots.len())
            .map(|i| {
                if i < request.required_len {
                    Classification::Data
                } else {
                    Classification::Reserved
                }
            })
            .collect();

        debug!(
            request = %request.id,
            pages = ?pages,
            reserved = slots.len() - request.required_len,
            "Paged placement"
        );

        Ok(Placement {
            slots,
            classifications,
        })
    }
}
