// SlotSim - Serving-system memory allocation simulator
// Static contiguous reservation vs. paged allocation, with FIFO eviction

#![warn(rust_2018_idioms)]

pub mod config;
pub mod memory;
pub mod workload;

// Re-exports for convenience
pub use config::SimulatorConfig;
pub use memory::{
    AdmissionOutcome, AllocationMode, Request, RequestId, SharedSimulator, Simulator,
    UtilizationReport,
};
pub use workload::Workload;

/// SlotSim error types
pub mod error {
    use crate::memory::RequestId;
    use thiserror::Error;

    /// Allocation failures surfaced by the simulator
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum AllocationError {
        #[error("No contiguous window of {needed} free slots")]
        InsufficientContiguousSpace { needed: usize },

        #[error("Need {needed} free pages, only {available} available")]
        InsufficientPages { needed: usize, available: usize },

        #[error("Out of memory: cannot admit {request_id} ({needed} slots)")]
        OutOfMemory { request_id: RequestId, needed: usize },

        #[error("Request not found: {0}")]
        NotFound(RequestId),

        #[error("Request already live: {0}")]
        DuplicateRequest(RequestId),

        #[error("Invalid request: {0}")]
        InvalidRequest(String),
    }

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Allocation error: {0}")]
        Allocation(#[from] AllocationError),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Workload error: {0}")]
        Workload(String),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::error::{AllocationError, Error};
    use super::*;

    #[test]
    fn test_version_format() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_allocation_error_converts() {
        let err: Error = AllocationError::NotFound(RequestId::new("R1")).into();
        assert_eq!(err.to_string(), "Allocation error: Request not found: R1");
    }
}
