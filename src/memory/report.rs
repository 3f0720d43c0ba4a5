//! Utilization accounting

use super::arena::SlotArena;
use super::eviction::Ledger;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Occupancy and fragmentation figures, derived from arena and ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationReport {
    pub total_slots: usize,
    pub occupied_slots: usize,
    pub occupancy_pct: u32,
    /// Slots carrying payload, i.e. the sum of live `required_len`
    pub actual_data_slots: usize,
    /// Occupied slots without payload (waste or reserved)
    pub waste_slots: usize,
    pub waste_rate_pct: u32,
    /// `100 - waste_rate_pct`, or 100 for an empty arena
    pub efficiency_score: u32,
    pub live_requests: usize,
}

/// Round `100 * part / whole` half away from zero
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

impl UtilizationReport {
    /// Recompute the report from current state
    pub fn compute(arena: &SlotArena, ledger: &Ledger) -> Self {
        let total_slots = arena.total_slots();
        let occupied_slots = arena.occupied_count();
        let actual_data_slots = ledger.data_slots();
        assert!(
            actual_data_slots <= occupied_slots,
            "live requests claim more data slots than are occupied"
        );
        let waste_slots = occupied_slots - actual_data_slots;
        let waste_rate_pct = percent(waste_slots, occupied_slots);

        Self {
            total_slots,
            occupied_slots,
            occupancy_pct: percent(occupied_slots, total_slots),
            actual_data_slots,
            waste_slots,
            waste_rate_pct,
            efficiency_score: if occupied_slots > 0 {
                100 - waste_rate_pct
            } else {
                100
            },
            live_requests: ledger.len(),
        }
    }
}

impl fmt::Display for UtilizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Occupancy:   {}/{} slots ({}%)",
            self.occupied_slots, self.total_slots, self.occupancy_pct
        )?;
        writeln!(f, "Data:        {} slots", self.actual_data_slots)?;
        writeln!(
            f,
            "Waste:       {} slots ({}%)",
            self.waste_slots, self.waste_rate_pct
        )?;
        writeln!(f, "Efficiency:  {}", self.efficiency_score)?;
        write!(f, "Live:        {} requests", self.live_requests)
    }
}
