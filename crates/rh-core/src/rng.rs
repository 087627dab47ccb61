//! Deterministic simulation RNG.
//!
//! The dispatcher owns exactly one `SimRng` per run.  It is seeded explicitly
//! (from `DispatchConfig::seed`) or injected by the caller, so the same seed
//! and inputs always reproduce the same dropout decisions.  Independent
//! Monte Carlo runs each get their own `SimRng`; nothing is shared.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG.
///
/// Used only from the single-threaded dispatch loop.  If you need parallel
/// randomness, give each run its own `SimRng`.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

impl std::fmt::Debug for SimRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SimRng")
    }
}
