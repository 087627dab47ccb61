//! Fluent builder for constructing a [`Dispatcher`].

use std::sync::Arc;

use rh_core::SimRng;
use rh_spatial::{RoadNetwork, Router};

use crate::fleet::{Driver, Passenger};
use crate::{DispatchConfig, DispatchError, DispatchResult, Dispatcher};

/// Fluent builder for [`Dispatcher<R>`].
///
/// # Required inputs
///
/// - `Arc<RoadNetwork>`: shared, immutable road graph
/// - `R: Router`: the routing algorithm (e.g. [`rh_spatial::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                  |
/// |-------------------|------------------------------------------|
/// | `.config(c)`      | `DispatchConfig::default()`              |
/// | `.rng(r)`         | `SimRng::new(config.seed)`               |
/// | `.drivers(v)`     | no drivers                               |
/// | `.passengers(v)`  | no passengers                            |
///
/// Drivers and passengers are already anchored to nodes; see
/// [`snap_drivers`](crate::snap_drivers) and
/// [`snap_passengers`](crate::snap_passengers).
///
/// # Example
///
/// ```rust,ignore
/// let drivers = snap_drivers(&driver_records, &grid)?;
/// let passengers = snap_passengers(&passenger_records, &grid)?;
/// let mut dispatcher = DispatchBuilder::new(network, DijkstraRouter)
///     .drivers(drivers)
///     .passengers(passengers)
///     .build()?;
/// let outcome = dispatcher.run(&mut NoopObserver);
/// ```
pub struct DispatchBuilder<R: Router> {
    network:    Arc<RoadNetwork>,
    router:     R,
    config:     DispatchConfig,
    rng:        Option<SimRng>,
    drivers:    Vec<Driver>,
    passengers: Vec<Passenger>,
}

impl<R: Router> DispatchBuilder<R> {
    pub fn new(network: Arc<RoadNetwork>, router: R) -> Self {
        Self {
            network,
            router,
            config:     DispatchConfig::default(),
            rng:        None,
            drivers:    Vec::new(),
            passengers: Vec::new(),
        }
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a pre-seeded RNG instead of deriving one from `config.seed`.
    pub fn rng(mut self, rng: SimRng) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn drivers(mut self, drivers: Vec<Driver>) -> Self {
        self.drivers = drivers;
        self
    }

    /// Passengers must be sorted by `requested_at`; ties keep their order.
    pub fn passengers(mut self, passengers: Vec<Passenger>) -> Self {
        self.passengers = passengers;
        self
    }

    /// Validate inputs, fill the driver queue, and return a ready-to-run
    /// [`Dispatcher`].
    pub fn build(self) -> DispatchResult<Dispatcher<R>> {
        self.config.validate()?;

        let node_count = self.network.node_count();
        let check_node = |what: &'static str, node: rh_core::NodeId| {
            if node.index() < node_count {
                Ok(())
            } else {
                Err(DispatchError::NodeOutOfRange { what, node, node_count })
            }
        };
        for d in &self.drivers {
            check_node("driver", d.node)?;
        }
        for p in &self.passengers {
            check_node("pickup", p.pickup)?;
            check_node("dropoff", p.dropoff)?;
        }

        // ── Passenger order ───────────────────────────────────────────────
        for pair in self.passengers.windows(2) {
            if pair[1].requested_at < pair[0].requested_at {
                return Err(DispatchError::UnsortedPassengers {
                    passenger:    pair[1].id,
                    requested_at: pair[1].requested_at,
                    previous:     pair[0].requested_at,
                });
            }
        }

        let rng = self.rng.unwrap_or_else(|| SimRng::new(self.config.seed));
        Ok(Dispatcher::new(
            self.network,
            self.router,
            self.config,
            rng,
            self.drivers,
            self.passengers,
        ))
    }
}
