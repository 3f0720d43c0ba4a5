//! Thread-safe handle around a [`Simulator`]

use super::eviction::{AdmissionOutcome, AllocationRecord};
use super::report::UtilizationReport;
use super::simulator::{Simulator, Snapshot};
use super::slot::{Request, RequestId};
use super::strategy::AllocationMode;
use crate::error::AllocationError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle sharing one simulator between threads
///
/// Every operation holds the lock for its whole duration, so an admission
/// and all the evictions it triggers are one critical section.
#[derive(Debug, Clone)]
pub struct SharedSimulator {
    inner: Arc<Mutex<Simulator>>,
}

impl SharedSimulator {
    pub fn new(simulator: Simulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulator)),
        }
    }

    pub fn admit(&self, request: Request) -> Result<AdmissionOutcome, AllocationError> {
        self.inner.lock().admit(request)
    }

    pub fn release(&self, request_id: &RequestId) -> Result<(), AllocationError> {
        self.inner.lock().release(request_id)
    }

    pub fn release_random(&self) -> Option<RequestId> {
        self.inner.lock().release_random()
    }

    pub fn reset(&self, mode: AllocationMode) {
        self.inner.lock().reset(mode)
    }

    pub fn report(&self) -> UtilizationReport {
        self.inner.lock().report()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().snapshot()
    }

    pub fn allocation(&self, request_id: &RequestId) -> Option<AllocationRecord> {
        self.inner.lock().allocation(request_id).cloned()
    }
}
