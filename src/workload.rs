//! Scripted workloads
//!
//! A workload is a JSON list of steps replayed against a [`Simulator`]:
//!
//! ```json
//! { "steps": [
//!     { "op": "admit", "id": "TK-1001", "len": 5 },
//!     { "op": "admit", "id": "TK-1002", "len": 10, "units": 2 },
//!     { "op": "release", "id": "TK-1001" },
//!     { "op": "release_random" },
//!     { "op": "reset", "mode": "standard" }
//! ] }
//! ```

use crate::error::{AllocationError, Error, Result};
use crate::memory::{AdmissionOutcome, AllocationMode, Request, RequestId, Simulator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Admit {
        id: RequestId,
        len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        units: Option<usize>,
    },
    Release {
        id: RequestId,
    },
    ReleaseRandom,
    Reset {
        mode: AllocationMode,
    },
}

/// What happened when a step was replayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Admitted {
        id: RequestId,
        outcome: AdmissionOutcome,
    },
    Released {
        id: RequestId,
    },
    /// `release_random` with nothing live
    Idle,
    Reset {
        mode: AllocationMode,
    },
    Failed {
        error: String,
    },
}

/// Ordered list of steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub steps: Vec<Step>,
}

impl Workload {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source)
            .map_err(|e| Error::Workload(format!("Failed to parse workload: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Workload(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let workload = Self::from_json(&source)?;
        info!(path = %path.display(), steps = workload.steps.len(), "Loaded workload");
        Ok(workload)
    }

    /// Replay every step in order.
    ///
    /// Allocation failures are recorded per step and do not stop the replay.
    pub fn replay(&self, simulator: &mut Simulator) -> Vec<StepResult> {
        self.steps
            .iter()
            .map(|step| {
                let result = apply(simulator, step);
                debug!(?step, ?result, "Replayed step");
                result
            })
            .collect()
    }
}

fn apply(simulator: &mut Simulator, step: &Step) -> StepResult {
    match step {
        Step::Admit { id, len, units } => {
            let mut request = Request::new(id.clone(), *len);
            request.unit_count = *units;
            match simulator.admit(request) {
                Ok(outcome) => StepResult::Admitted {
                    id: id.clone(),
                    outcome,
                },
                Err(err) => failed(err),
            }
        }
        Step::Release { id } => match simulator.release(id) {
            Ok(()) => StepResult::Released { id: id.clone() },
            Err(err) => failed(err),
        },
        Step::ReleaseRandom => match simulator.release_random() {
            Some(id) => StepResult::Released { id },
            None => StepResult::Idle,
        },
        Step::Reset { mode } => {
            simulator.reset(*mode);
            StepResult::Reset { mode: *mode }
        }
    }
}

fn failed(err: AllocationError) -> StepResult {
    StepResult::Failed {
        error: err.to_string(),
    }
}
