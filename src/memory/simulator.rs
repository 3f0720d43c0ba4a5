//! Allocator front end
//!
//! [`Simulator`] owns the arena, the ledger and the active strategy. Callers
//! only ever go through its operations; nothing outside mutates slot or
//! ledger state directly.

use super::eviction::{AdmissionOutcome, AllocationRecord, EvictionController};
use super::report::UtilizationReport;
use super::selector::{PageSelector, RandomPageSelector};
use super::slot::{Request, RequestId, SlotState};
use super::strategy::{AllocationMode, Strategy};
use crate::config::SimulatorConfig;
use crate::error::{AllocationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Per-slot state plus the ordered ledger, for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: AllocationMode,
    pub slots: Vec<SlotState>,
    /// Live requests, oldest first
    pub ledger: Vec<AllocationRecord>,
}

/// Simulated allocator with FIFO eviction
pub struct Simulator {
    config: SimulatorConfig,
    strategy: Strategy,
    controller: EvictionController,
    selector: Box<dyn PageSelector>,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("mode", &self.strategy.mode())
            .field("live", &self.controller.ledger().len())
            .finish()
    }
}

impl Simulator {
    /// Create a simulator using random page selection
    ///
    /// A configured seed makes the page choice reproducible.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        let selector: Box<dyn PageSelector> = match config.seed {
            Some(seed) => Box::new(RandomPageSelector::seeded(seed)),
            None => Box::new(RandomPageSelector::new()),
        };
        Self::with_selector(config, selector)
    }

    /// Create a simulator with a caller-supplied page selector
    pub fn with_selector(config: SimulatorConfig, selector: Box<dyn PageSelector>) -> Result<Self> {
        config.validate()?;

        info!(
            total_slots = config.total_slots,
            unit_size = config.unit_size,
            page_size = config.page_size,
            mode = %config.mode,
            "Initializing simulator"
        );

        Ok(Self {
            strategy: Strategy::for_mode(config.mode, config.unit_size, config.page_size),
            controller: EvictionController::new(config.total_slots),
            config,
            selector,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn mode(&self) -> AllocationMode {
        self.strategy.mode()
    }

    /// Admit `request`, evicting the oldest live requests if it does not fit
    pub fn admit(&mut self, request: Request) -> std::result::Result<AdmissionOutcome, AllocationError> {
        let strategy = self.strategy;
        let request = strategy.prepare(request)?;
        // An overflowing footprint saturates, which the never-fits check rejects
        let footprint = strategy.footprint(&request).unwrap_or(usize::MAX);
        let selector = &mut self.selector;

        self.controller.admit(request, footprint, |arena, request| {
            strategy.place(arena, request, &mut **selector)
        })
    }

    /// Free a live request by id
    pub fn release(&mut self, request_id: &RequestId) -> std::result::Result<(), AllocationError> {
        self.controller.release(request_id).map(|_| ())
    }

    /// Free one live request picked by the page selector.
    ///
    /// Returns the released id, or `None` if nothing is live.
    pub fn release_random(&mut self) -> Option<RequestId> {
        let positions: Vec<usize> = (0..self.controller.ledger().len()).collect();
        let position = *self.selector.choose(&positions, 1).first()?;
        let id = self.controller.ledger().iter().nth(position)?.id().clone();
        self.controller.release(&id).ok().map(|record| record.request.id)
    }

    /// Clear arena and ledger and switch to `mode`
    pub fn reset(&mut self, mode: AllocationMode) {
        self.controller.clear();
        self.strategy = Strategy::for_mode(mode, self.config.unit_size, self.config.page_size);
        info!(mode = %mode, "Simulator reset");
    }

    pub fn report(&self) -> UtilizationReport {
        UtilizationReport::compute(self.controller.arena(), self.controller.ledger())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode(),
            slots: self.controller.arena().slots().to_vec(),
            ledger: self.controller.ledger().iter().cloned().collect(),
        }
    }

    /// Allocation record of a live request
    pub fn allocation(&self, request_id: &RequestId) -> Option<&AllocationRecord> {
        self.controller.ledger().get(request_id)
    }

    /// Number of live requests
    pub fn live_requests(&self) -> usize {
        self.controller.ledger().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::selector::SequentialPageSelector;
    use crate::memory::slot::{Classification, SlotRange};

    fn simulator(mode: AllocationMode, total_slots: usize) -> Simulator {
        let config = SimulatorConfig {
            total_slots,
            mode,
            ..SimulatorConfig::default()
        };
        Simulator::with_selector(config, Box::new(SequentialPageSelector)).unwrap()
    }

    #[test]
    fn test_reset_clears_state_and_switches_mode() {
        let mut sim = simulator(AllocationMode::Paged, 64);
        sim.admit(Request::new("R1", 5)).unwrap();
        assert_eq!(sim.live_requests(), 1);

        sim.reset(AllocationMode::Standard);
        assert_eq!(sim.mode(), AllocationMode::Standard);
        assert_eq!(sim.live_requests(), 0);
        assert_eq!(sim.report().occupied_slots, 0);

        let outcome = sim.admit(Request::new("R1", 5)).unwrap();
        assert_eq!(outcome.allocated_slots, vec![SlotRange::new(0, 8)]);
    }

    #[test]
    fn test_allocation_lookup() {
        let mut sim = simulator(AllocationMode::Paged, 16);
        sim.admit(Request::new("R1", 3)).unwrap();

        let record = sim.allocation(&RequestId::new("R1")).unwrap();
        assert_eq!(record.slots, vec![0, 1, 2, 3]);
        assert!(sim.allocation(&RequestId::new("R2")).is_none());
    }

    #[test]
    fn test_release_random_empties_ledger() {
        let mut sim = simulator(AllocationMode::Paged, 16);
        assert!(sim.release_random().is_none());

        sim.admit(Request::new("R1", 2)).unwrap();
        sim.admit(Request::new("R2", 2)).unwrap();

        // The sequential selector always picks the oldest
        assert_eq!(sim.release_random(), Some(RequestId::new("R1")));
        assert_eq!(sim.release_random(), Some(RequestId::new("R2")));
        assert!(sim.release_random().is_none());
        assert_eq!(sim.report().occupied_slots, 0);
    }

    #[test]
    fn test_snapshot_matches_report() {
        let mut sim = simulator(AllocationMode::Standard, 32);
        sim.admit(Request::new("R1", 5)).unwrap();
        sim.admit(Request::new("R2", 8)).unwrap();

        let snapshot = sim.snapshot();
        let waste = snapshot
            .slots
            .iter()
            .filter(|s| s.classification() == Some(Classification::Waste))
            .count();
        assert_eq!(waste, sim.report().waste_slots);
        assert_eq!(snapshot.ledger.len(), 2);
        assert_eq!(snapshot.ledger[0].request.unit_count, Some(1));
    }

    #[test]
    fn test_overflowing_footprint_is_out_of_memory() {
        for (mode, request) in [
            (AllocationMode::Standard, Request::new("B", 1).with_units(usize::MAX / 4)),
            (AllocationMode::Paged, Request::new("B", usize::MAX)),
        ] {
            let mut sim = simulator(mode, 16);
            sim.admit(Request::new("A", 4)).unwrap();
            let before = sim.snapshot();

            let err = sim.admit(request).unwrap_err();
            assert_eq!(
                err,
                AllocationError::OutOfMemory {
                    request_id: RequestId::new("B"),
                    needed: usize::MAX
                }
            );
            assert_eq!(sim.snapshot(), before);
            assert_eq!(sim.report().actual_data_slots, 4);
        }
    }

    #[test]
    fn test_invalid_request_is_rejected_before_eviction() {
        let mut sim = simulator(AllocationMode::Standard, 16);
        sim.admit(Request::new("R1", 4)).unwrap();

        let err = sim.admit(Request::new("R2", 12).with_units(1)).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidRequest(_)));
        assert_eq!(sim.live_requests(), 1);
    }
}
