//! Page selection policies
//!
//! The paged allocator deliberately scatters a request across the arena.
//! Which free pages it takes is delegated to a [`PageSelector`] so tests
//! can pin placement down while production keeps the uniform random pick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses `k` distinct elements from a candidate list
pub trait PageSelector: Send {
    /// Return `k` distinct elements of `candidates`, in selection order.
    ///
    /// Callers guarantee `k <= candidates.len()`.
    fn choose(&mut self, candidates: &[usize], k: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement
#[derive(Debug)]
pub struct RandomPageSelector {
    rng: StdRng,
}

impl RandomPageSelector {
    /// Selector seeded from the OS entropy source
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible selector
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPageSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSelector for RandomPageSelector {
    fn choose(&mut self, candidates: &[usize], k: usize) -> Vec<usize> {
        let mut pool = candidates.to_vec();
        let mut chosen = Vec::with_capacity(k);
        for _ in 0..k.min(pool.len()) {
            let pick = self.rng.gen_range(0..pool.len());
            chosen.push(pool.remove(pick));
        }
        chosen
    }
}

/// Deterministic selector taking the first `k` candidates
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialPageSelector;

impl PageSelector for SequentialPageSelector {
    fn choose(&mut self, candidates: &[usize], k: usize) -> Vec<usize> {
        candidates.iter().take(k).copied().collect()
    }
}
