//! Monte Carlo batches: one independent run per seed.

use std::sync::Arc;

use rh_spatial::{RoadNetwork, Router};

use crate::fleet::{Driver, Passenger};
use crate::{DispatchBuilder, DispatchConfig, DispatchResult, NoopObserver, RunOutcome};

/// Run one dispatch per seed over the same snapped drivers and passengers.
///
/// Every run gets its own dispatcher, queue and RNG (`config` with `seed`
/// substituted); only the network is shared.  Outcomes are returned in seed
/// order.  With the `parallel` feature the runs execute concurrently.
pub fn run_batch<R>(
    network:    &Arc<RoadNetwork>,
    router:     &R,
    drivers:    &[Driver],
    passengers: &[Passenger],
    config:     DispatchConfig,
    seeds:      &[u64],
) -> DispatchResult<Vec<RunOutcome>>
where
    R: Router + Clone,
{
    let run_one = |seed: u64| -> DispatchResult<RunOutcome> {
        let mut dispatcher = DispatchBuilder::new(Arc::clone(network), router.clone())
            .config(DispatchConfig { seed, ..config })
            .drivers(drivers.to_vec())
            .passengers(passengers.to_vec())
            .build()?;
        Ok(dispatcher.run(&mut NoopObserver))
    };

    #[cfg(not(feature = "parallel"))]
    {
        seeds.iter().map(|&seed| run_one(seed)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        seeds.par_iter().map(|&seed| run_one(seed)).collect()
    }
}
