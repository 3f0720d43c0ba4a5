//! Static contiguous allocator
//!
//! Every request reserves `unit_count * unit_size` contiguous slots. The
//! tail of the reservation past `required_len` is classified as waste,
//! which is exactly the internal fragmentation this strategy pays for.

use super::arena::SlotArena;
use super::slot::{Classification, Request};
use super::strategy::Placement;
use crate::error::AllocationError;
use tracing::debug;

/// First-fit allocator over fixed-size units
#[derive(Debug, Clone, Copy)]
pub struct StandardAllocator {
    /// Slots per unit (the maximum sequence length)
    pub unit_size: usize,
}

impl StandardAllocator {
    pub fn new(unit_size: usize) -> Self {
        Self { unit_size }
    }

    /// Smallest unit count that holds `required_len` slots
    pub fn min_units(&self, required_len: usize) -> usize {
        required_len.div_ceil(self.unit_size)
    }

    /// Fill in the unit count and check the request is well-formed
    pub fn prepare(&self, mut request: Request) -> Result<Request, AllocationError> {
        if request.required_len == 0 {
            return Err(AllocationError::InvalidRequest(format!(
                "request {} has zero length",
                request.id
            )));
        }

        let min = self.min_units(request.required_len);
        let units = request.unit_count.unwrap_or(min);
        if units < min {
            return Err(AllocationError::InvalidRequest(format!(
                "request {} needs at least {} units of {} slots, got {}",
                request.id, min, self.unit_size, units
            )));
        }

        request.unit_count = Some(units);
        Ok(request)
    }

    /// Slots reserved for a prepared request, `None` if the count overflows
    pub fn footprint(&self, request: &Request) -> Option<usize> {
        request
            .unit_count
            .unwrap_or_else(|| self.min_units(request.required_len))
            .checked_mul(self.unit_size)
    }

    /// Find the lowest-addressed free window for `request` and classify it
    pub fn place(&self, arena: &SlotArena, request: &Request) -> Result<Placement, AllocationError> {
        let needed = self
            .footprint(request)
            .ok_or(AllocationError::InsufficientContiguousSpace { needed: usize::MAX })?;
        let last_start = arena.total_slots().checked_sub(needed);

        let start = last_start
            .and_then(|last| (0..=last).find(|&start| arena.is_range_free(start, needed)))
            .ok_or(AllocationError::InsufficientContiguousSpace { needed })?;

        let slots: Vec<usize> = (start..start + needed).collect();
        let classifications = (0..needed)
            .map(|i| {
                if i < request.required_len {
                    Classification::Data
                } else {
                    Classification::Waste
                }
            })
            .collect();

        debug!(
            request = %request.id,
            start,
            reserved = needed,
            waste = needed - request.required_len,
            "Standard placement"
        );

        Ok(Placement {
            slots,
            classifications,
        })
    }
}
