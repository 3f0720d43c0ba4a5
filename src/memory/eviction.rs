//! FIFO eviction and the admission ledger
//!
//! # Admission loop
//!
//! ```text
//! admit(R)
//!   ├─→ place(R) ── ok ──→ occupy slots, push R to ledger back
//!   │      │
//!   │     err
//!   │      ├─→ ledger empty → OutOfMemory
//!   │      └─→ evict ledger front, free its slots, retry
//! ```
//!
//! Each retry shrinks the ledger by one, so an admission makes at most
//! `ledger.len() + 1` placement attempts.

use super::arena::SlotArena;
use super::slot::{Request, RequestId, SlotRange};
use super::strategy::Placement;
use crate::error::AllocationError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// A live request and the slots it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub request: Request,
    /// Slot indices in placement order
    pub slots: Vec<usize>,
    /// Admission sequence number, strictly increasing along the ledger
    pub sequence: u64,
}

impl AllocationRecord {
    pub fn id(&self) -> &RequestId {
        &self.request.id
    }

    /// Slots as maximal contiguous runs
    pub fn ranges(&self) -> Vec<SlotRange> {
        SlotRange::coalesce(&self.slots)
    }
}

/// Live requests in admission order, oldest first
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: VecDeque<AllocationRecord>,
    next_sequence: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.entries.iter()
    }

    pub fn get(&self, id: &RequestId) -> Option<&AllocationRecord> {
        self.entries.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.get(id).is_some()
    }

    /// Oldest live request
    pub fn front(&self) -> Option<&AllocationRecord> {
        self.entries.front()
    }

    fn push(&mut self, request: Request, slots: Vec<usize>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push_back(AllocationRecord {
            request,
            slots,
            sequence,
        });
        sequence
    }

    fn pop_front(&mut self) -> Option<AllocationRecord> {
        self.entries.pop_front()
    }

    fn remove(&mut self, id: &RequestId) -> Option<AllocationRecord> {
        let position = self.entries.iter().position(|r| r.id() == id)?;
        self.entries.remove(position)
    }

    /// Sum of payload lengths across live requests
    pub fn data_slots(&self) -> usize {
        self.entries.iter().map(|r| r.request.required_len).sum()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of a successful admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionOutcome {
    /// Slots now held by the admitted request, as contiguous runs in placement order
    pub allocated_slots: Vec<SlotRange>,
    /// Requests evicted to make room, oldest first
    pub evicted_request_ids: Vec<RequestId>,
    /// Placement attempts made, including the successful one
    pub attempts: usize,
}

/// Owns the arena and ledger and runs the evict-and-retry loop
#[derive(Debug, Clone)]
pub struct EvictionController {
    arena: SlotArena,
    ledger: Ledger,
}

impl EvictionController {
    pub fn new(total_slots: usize) -> Self {
        Self {
            arena: SlotArena::new(total_slots),
            ledger: Ledger::new(),
        }
    }

    pub fn arena(&self) -> &SlotArena {
        &self.arena
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Admit a prepared request, evicting oldest-first until `place` succeeds.
    ///
    /// `footprint` is the number of slots the request occupies. A request
    /// that would not fit even in an empty arena fails before anything is
    /// evicted.
    pub fn admit<F>(
        &mut self,
        request: Request,
        footprint: usize,
        mut place: F,
    ) -> Result<AdmissionOutcome, AllocationError>
    where
        F: FnMut(&SlotArena, &Request) -> Result<Placement, AllocationError>,
    {
        if self.ledger.contains(&request.id) {
            return Err(AllocationError::DuplicateRequest(request.id));
        }
        if footprint > self.arena.total_slots() {
            warn!(request = %request.id, needed = footprint, "Request can never fit");
            return Err(AllocationError::OutOfMemory {
                request_id: request.id,
                needed: footprint,
            });
        }

        let mut evicted = Vec::new();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match place(&self.arena, &request) {
                Ok(placement) => {
                    self.arena
                        .occupy(&placement.slots, &request.id, &placement.classifications);
                    let allocated_slots = SlotRange::coalesce(&placement.slots);
                    debug!(
                        request = %request.id,
                        attempts,
                        evicted = evicted.len(),
                        "Admitted request"
                    );
                    let sequence = self.ledger.push(request, placement.slots);
                    debug!(sequence, "Ledger appended");
                    return Ok(AdmissionOutcome {
                        allocated_slots,
                        evicted_request_ids: evicted,
                        attempts,
                    });
                }
                Err(err) => match self.evict_oldest() {
                    Some(victim) => {
                        warn!(
                            request = %request.id,
                            victim = %victim.id(),
                            reason = %err,
                            "Evicted oldest request"
                        );
                        evicted.push(victim.request.id);
                    }
                    None => {
                        warn!(request = %request.id, reason = %err, "Out of memory");
                        return Err(AllocationError::OutOfMemory {
                            request_id: request.id,
                            needed: footprint,
                        });
                    }
                },
            }
        }
    }

    /// Free the oldest live request
    pub fn evict_oldest(&mut self) -> Option<AllocationRecord> {
        let victim = self.ledger.pop_front()?;
        self.arena.free(&victim.slots);
        Some(victim)
    }

    /// Free a specific live request
    pub fn release(&mut self, id: &RequestId) -> Result<AllocationRecord, AllocationError> {
        let record = self
            .ledger
            .remove(id)
            .ok_or_else(|| AllocationError::NotFound(id.clone()))?;
        self.arena.free(&record.slots);
        debug!(request = %id, slots = record.slots.len(), "Released request");
        Ok(record)
    }

    /// Drop every live request and free the whole arena
    pub fn clear(&mut self) {
        self.arena.clear();
        self.ledger.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::slot::Classification;

    /// Places requests first-fit into the lowest free slots, one slot per unit of length
    fn first_free(arena: &SlotArena, request: &Request) -> Result<Placement, AllocationError> {
        let slots: Vec<usize> = (0..arena.total_slots())
            .filter(|&i| arena.state(i).is_some_and(|s| s.is_free()))
            .take(request.required_len)
            .collect();
        if slots.len() < request.required_len {
            return Err(AllocationError::InsufficientPages {
                needed: request.required_len,
                available: slots.len(),
            });
        }
        let classifications = vec![Classification::Data; slots.len()];
        Ok(Placement {
            slots,
            classifications,
        })
    }

    fn admit(
        controller: &mut EvictionController,
        id: &str,
        len: usize,
    ) -> Result<AdmissionOutcome, AllocationError> {
        controller.admit(Request::new(id, len), len, first_free)
    }

    #[test]
    fn test_admit_without_eviction() {
        let mut controller = EvictionController::new(8);
        let outcome = admit(&mut controller, "R1", 3).unwrap();
        assert_eq!(outcome.allocated_slots, vec![SlotRange::new(0, 3)]);
        assert!(outcome.evicted_request_ids.is_empty());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(controller.ledger().len(), 1);
        assert_eq!(
            controller.ledger().front().map(|r| r.ranges()),
            Some(outcome.allocated_slots)
        );
    }

    #[test]
    fn test_fifo_evicts_exactly_two_oldest() {
        let mut controller = EvictionController::new(9);
        for id in ["r1", "r2", "r3"] {
            admit(&mut controller, id, 3).unwrap();
        }

        let outcome = admit(&mut controller, "r4", 6).unwrap();
        assert_eq!(
            outcome.evicted_request_ids,
            vec![RequestId::new("r1"), RequestId::new("r2")]
        );
        assert_eq!(outcome.attempts, 3);

        let live: Vec<&str> = controller.ledger().iter().map(|r| r.id().as_str()).collect();
        assert_eq!(live, vec!["r3", "r4"]);
    }

    #[test]
    fn test_release_preserves_survivor_order() {
        let mut controller = EvictionController::new(8);
        for id in ["a", "b", "c"] {
            admit(&mut controller, id, 2).unwrap();
        }
        controller.release(&RequestId::new("b")).unwrap();

        let live: Vec<u64> = controller.ledger().iter().map(|r| r.sequence).collect();
        assert_eq!(live, vec![0, 2]);
        assert_eq!(controller.arena().occupied_count(), 4);
    }

    #[test]
    fn test_release_unknown_is_not_found() {
        let mut controller = EvictionController::new(8);
        admit(&mut controller, "a", 2).unwrap();

        let err = controller.release(&RequestId::new("zzz")).unwrap_err();
        assert_eq!(err, AllocationError::NotFound(RequestId::new("zzz")));
        assert_eq!(controller.ledger().len(), 1);
        assert_eq!(controller.arena().occupied_count(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut controller = EvictionController::new(8);
        admit(&mut controller, "a", 2).unwrap();
        let err = admit(&mut controller, "a", 2).unwrap_err();
        assert_eq!(err, AllocationError::DuplicateRequest(RequestId::new("a")));
    }

    #[test]
    fn test_oversized_fails_without_eviction() {
        let mut controller = EvictionController::new(8);
        admit(&mut controller, "a", 2).unwrap();

        let err = admit(&mut controller, "huge", 9).unwrap_err();
        assert!(matches!(err, AllocationError::OutOfMemory { needed: 9, .. }));
        assert_eq!(controller.ledger().len(), 1);
    }

    #[test]
    fn test_saturated_footprint_fails_without_eviction() {
        let mut controller = EvictionController::new(8);
        admit(&mut controller, "a", 2).unwrap();

        let err = controller
            .admit(Request::new("huge", 1), usize::MAX, first_free)
            .unwrap_err();
        assert_eq!(
            err,
            AllocationError::OutOfMemory {
                request_id: RequestId::new("huge"),
                needed: usize::MAX
            }
        );
        assert_eq!(controller.ledger().len(), 1);
        assert_eq!(controller.arena().occupied_count(), 2);
    }

    #[test]
    fn test_out_of_memory_when_ledger_drains() {
        let mut controller = EvictionController::new(8);
        admit(&mut controller, "a", 2).unwrap();

        // A placement policy that never succeeds
        let err = controller
            .admit(Request::new("b", 1), 1, |_, _| {
                Err(AllocationError::InsufficientContiguousSpace { needed: 1 })
            })
            .unwrap_err();
        assert!(matches!(err, AllocationError::OutOfMemory { .. }));
        assert!(controller.ledger().is_empty());
        assert_eq!(controller.arena().occupied_count(), 0);
    }
}
