//! Fixed-size slot table

use super::slot::{Classification, RequestId, SlotState};
use tracing::debug;

/// Fixed-capacity array of slots
///
/// Slots never move. A slot changes hands only through [`SlotArena::occupy`]
/// and [`SlotArena::free`].
#[derive(Debug, Clone)]
pub struct SlotArena {
    slots: Vec<SlotState>,
}

impl SlotArena {
    /// Create an arena of `total_slots` free slots
    pub fn new(total_slots: usize) -> Self {
        Self {
            slots: vec![SlotState::Free; total_slots],
        }
    }

    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// State of the slot at `index`, or `None` past the end
    pub fn state(&self, index: usize) -> Option<&SlotState> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    /// True iff every slot in `[start, start + len)` is free.
    ///
    /// Ranges that run past the end are never free.
    pub fn is_range_free(&self, start: usize, len: usize) -> bool {
        match start.checked_add(len) {
            Some(end) if end <= self.slots.len() => {
                self.slots[start..end].iter().all(SlotState::is_free)
            }
            _ => false,
        }
    }

    /// Assign each listed slot to `request_id` with the matching classification
    ///
    /// # Panics
    /// If the two lists differ in length, an index is out of bounds, or a
    /// listed slot is already occupied. Any of these is an allocator bug.
    pub fn occupy(
        &mut self,
        indices: &[usize],
        request_id: &RequestId,
        classifications: &[Classification],
    ) {
        assert_eq!(
            indices.len(),
            classifications.len(),
            "every occupied slot needs a classification"
        );

        for (&index, &classification) in indices.iter().zip(classifications) {
            let slot = &mut self.slots[index];
            assert!(
                slot.is_free(),
                "slot {} is already held by {:?}",
                index,
                slot.owner()
            );
            *slot = SlotState::Occupied {
                request_id: request_id.clone(),
                classification,
            };
        }

        debug!(request = %request_id, slots = indices.len(), "Occupied slots");
    }

    /// Reset each listed slot to free
    pub fn free(&mut self, indices: &[usize]) {
        for &index in indices {
            self.slots[index] = SlotState::Free;
        }
        debug!(slots = indices.len(), "Freed slots");
    }

    /// Reset every slot to free
    pub fn clear(&mut self) {
        self.slots.fill(SlotState::Free);
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }

    pub fn free_count(&self) -> usize {
        self.slots.len() - self.occupied_count()
    }

    /// Indices currently held by `request_id`, ascending
    pub fn owned_by(&self, request_id: &RequestId) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.owner() == Some(request_id))
            .map(|(i, _)| i)
            .collect()
    }
}
