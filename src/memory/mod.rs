//! Simulated slot allocator
//!
//! Models two ways a serving system can hand out fixed-capacity memory and
//! the FIFO eviction that keeps admitting new work when space runs out.
//!
//! # Architecture
//!
//! ```text
//! Simulator
//!   ├─→ Strategy
//!   │     ├─→ StandardAllocator  (first-fit, unit_size slots per unit)
//!   │     └─→ PagedAllocator     (random free pages via PageSelector)
//!   └─→ EvictionController
//!         ├─→ SlotArena          [D D D W W W W W | D D R . . . ]
//!         └─→ Ledger             [R1 → R2 → R3]  (oldest evicted first)
//!
//! UtilizationReport = f(SlotArena, Ledger), recomputed on demand
//! ```
//!
//! `D` slots carry payload; `W` (waste) and `R` (reserved) are occupied
//! slack left over by the reservation granularity of each strategy.

pub mod arena;
pub mod eviction;
pub mod paged;
pub mod production_tests;
pub mod report;
pub mod selector;
pub mod shared;
pub mod simulator;
pub mod slot;
pub mod standard;
pub mod strategy;

pub use arena::SlotArena;
pub use eviction::{AdmissionOutcome, AllocationRecord, EvictionController, Ledger};
pub use paged::PagedAllocator;
pub use report::UtilizationReport;
pub use selector::{PageSelector, RandomPageSelector, SequentialPageSelector};
pub use shared::SharedSimulator;
pub use simulator::{Simulator, Snapshot};
pub use slot::{Classification, Request, RequestId, SlotRange, SlotState};
pub use standard::StandardAllocator;
pub use strategy::{AllocationMode, Placement, Strategy};
