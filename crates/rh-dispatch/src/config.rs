//! Run configuration: RNG seed and driver dropout policy.

use rh_core::SimRng;

use crate::{DispatchError, DispatchResult};

/// Average number of rides a driver completes before going offline.
pub const EXPECTED_RIDES_PER_DRIVER: u32 = 15;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Whether and how often a driver leaves the fleet after a ride.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DropoutPolicy {
    /// Drivers recirculate forever.
    Never,
    /// After each ride, draw uniformly from `1..=expected_rides`; a 1 retires
    /// the driver.  Ride counts are then geometric with mean `expected_rides`.
    Geometric { expected_rides: u32 },
}

impl DropoutPolicy {
    /// Draw whether a driver who just finished a ride drops out.
    ///
    /// `Never` consumes no randomness.
    pub fn retires(&self, rng: &mut SimRng) -> bool {
        match *self {
            DropoutPolicy::Never => false,
            DropoutPolicy::Geometric { expected_rides: 0 } => false,
            DropoutPolicy::Geometric { expected_rides } => rng.gen_range(1..=expected_rides) == 1,
        }
    }

    fn validate(&self) -> DispatchResult<()> {
        match self {
            DropoutPolicy::Geometric { expected_rides: 0 } => Err(DispatchError::Config(
                "geometric dropout needs expected_rides >= 1; use DropoutPolicy::Never to disable dropout".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl Default for DropoutPolicy {
    fn default() -> Self {
        DropoutPolicy::Geometric { expected_rides: EXPECTED_RIDES_PER_DRIVER }
    }
}

/// Parameters of one dispatch run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Seed for the run's [`SimRng`].  Same seed + same inputs = same run.
    pub seed:    u64,
    pub dropout: DropoutPolicy,
}

impl DispatchConfig {
    pub fn validate(&self) -> DispatchResult<()> {
        self.dropout.validate()
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED, dropout: DropoutPolicy::default() }
    }
}
