//! The `Dispatcher` struct and its matching loop.

use std::sync::Arc;

use tracing::{debug, info, warn};

use rh_core::{PassengerId, SimRng};
use rh_spatial::{RoadNetwork, Router, TravelTime};

use crate::fleet::{Driver, Passenger};
use crate::metrics::{Metrics, RunOutcome, RunStatus};
use crate::observer::{DispatchObserver, RideRecord};
use crate::queue::DriverQueue;
use crate::DispatchConfig;

/// Result of processing one passenger.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Ride(RideRecord),
    /// No driver could reach the pickup, or the dropoff is unreachable from
    /// it.  Nothing changed except the unroutable count.
    Unroutable(PassengerId),
    /// The driver queue emptied; this and every later passenger is unmatched.
    Exhausted { unmatched: usize },
}

/// Online driver/passenger matcher.
///
/// `Dispatcher<R>` consumes passengers in request order.  For each one:
///
/// 1. **Gather**: pop the competing drivers from the [`DriverQueue`].
/// 2. **Route**: time each candidate's trip to the pickup (in parallel with
///    the `parallel` feature) and pick the fastest; unreachable never wins,
///    ties go to the earlier-popped driver.
/// 3. **Ride**: advance the driver's clock through pickup and dropoff and
///    record wait, idle and profit minutes.
/// 4. **Requeue**: losing candidates go back unchanged; the winner goes back
///    unless the dropout policy retires them.
///
/// Create via [`DispatchBuilder`](crate::DispatchBuilder).
pub struct Dispatcher<R: Router> {
    network:    Arc<RoadNetwork>,
    router:     R,
    config:     DispatchConfig,
    rng:        SimRng,
    queue:      DriverQueue,
    retired:    Vec<Driver>,
    passengers: Vec<Passenger>,
    /// Index of the next passenger to process.
    next:       usize,
    metrics:    Metrics,
    exhausted:  Option<usize>,
}

impl<R: Router> Dispatcher<R> {
    pub(crate) fn new(
        network:    Arc<RoadNetwork>,
        router:     R,
        config:     DispatchConfig,
        rng:        SimRng,
        drivers:    Vec<Driver>,
        passengers: Vec<Passenger>,
    ) -> Self {
        let metrics = Metrics { driver_count: drivers.len(), ..Metrics::default() };
        Self {
            network,
            router,
            config,
            rng,
            queue: DriverQueue::from_drivers(drivers),
            retired: Vec::new(),
            passengers,
            next: 0,
            metrics,
            exhausted: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Process every remaining passenger and return the outcome.
    ///
    /// Use [`NoopObserver`](crate::NoopObserver) if you don't need callbacks.
    pub fn run<O: DispatchObserver>(&mut self, observer: &mut O) -> RunOutcome {
        info!(
            drivers = self.queue.len(),
            passengers = self.remaining_passengers(),
            seed = self.config.seed,
            "dispatch run started"
        );
        observer.on_run_start(self.queue.len(), self.remaining_passengers());

        while self.step(observer).is_some() {}

        let outcome = self.outcome();
        info!(
            rides = outcome.metrics.rides_completed,
            unmatched = outcome.metrics.unmatched_passengers,
            unroutable = outcome.metrics.unroutable_passengers,
            dropped = outcome.metrics.dropped_drivers,
            "dispatch run finished"
        );
        observer.on_run_end(&outcome);
        outcome
    }

    /// Process exactly one passenger.  `None` once every passenger has been
    /// handled.
    ///
    /// Useful for tests and incremental stepping.
    pub fn step<O: DispatchObserver>(&mut self, observer: &mut O) -> Option<Step> {
        let passenger = *self.passengers.get(self.next)?;

        if self.queue.is_empty() {
            let unmatched = self.passengers.len() - self.next;
            self.next = self.passengers.len();
            self.metrics.unmatched_passengers += unmatched as u64;
            self.exhausted = Some(unmatched);
            warn!(passenger = %passenger.id, unmatched, "no drivers left; remaining passengers unmatched");
            observer.on_exhausted(unmatched);
            return Some(Step::Exhausted { unmatched });
        }
        self.next += 1;

        let candidates = self.queue.take_candidates(passenger.requested_at);
        let pickup_times = self.route_candidates(&candidates, &passenger);

        let Some((winner, pickup_minutes)) = fastest(&pickup_times) else {
            return Some(self.unroutable(candidates, &passenger, observer));
        };
        let driver = candidates[winner];

        let dispatched_at = driver.available_at.max(passenger.requested_at);
        let picked_up_at = dispatched_at.plus_minutes(pickup_minutes);
        let drive = self.router.travel_time(&self.network, passenger.pickup, passenger.dropoff, picked_up_at);
        let Some(drive_minutes) = drive.minutes() else {
            return Some(self.unroutable(candidates, &passenger, observer));
        };
        let dropped_off_at = picked_up_at.plus_minutes(drive_minutes);

        let ride = RideRecord {
            passenger: passenger.id,
            driver: driver.id,
            requested_at: passenger.requested_at,
            dispatched_at,
            picked_up_at,
            dropped_off_at,
            pickup_node: passenger.pickup,
            dropoff_node: passenger.dropoff,
            pickup_minutes,
            drive_minutes,
            wait_minutes: driver.available_at.minutes_since(passenger.requested_at).max(0.0)
                + pickup_minutes
                + drive_minutes,
            idle_minutes: passenger.requested_at.minutes_since(driver.available_at).max(0.0),
        };
        self.metrics.record_ride(&ride);
        debug!(
            passenger = %ride.passenger,
            driver = %ride.driver,
            candidates = candidates.len(),
            pickup = ride.pickup_minutes,
            drive = ride.drive_minutes,
            "ride matched"
        );
        observer.on_ride(&ride);

        // ── Requeue ───────────────────────────────────────────────────────
        for (i, &other) in candidates.iter().enumerate() {
            if i != winner {
                self.queue.push(other);
            }
        }
        let driver = Driver {
            node: passenger.dropoff,
            available_at: dropped_off_at,
            rides: driver.rides + 1,
            ..driver
        };
        if self.config.dropout.retires(&mut self.rng) {
            self.metrics.dropped_drivers += 1;
            debug!(driver = %driver.id, rides = driver.rides, "driver dropped out");
            observer.on_dropout(&driver);
            self.retired.push(driver);
        } else {
            self.queue.push(driver);
        }

        Some(Step::Ride(ride))
    }

    /// Status and metrics as of now.
    pub fn outcome(&self) -> RunOutcome {
        let status = match self.exhausted {
            Some(unmatched) => RunStatus::DriversExhausted { unmatched },
            None => RunStatus::Completed,
        };
        RunOutcome { status, metrics: self.metrics.clone() }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Drivers still in circulation.
    pub fn queue(&self) -> &DriverQueue {
        &self.queue
    }

    /// Drivers retired by the dropout policy, in retirement order.
    pub fn retired(&self) -> &[Driver] {
        &self.retired
    }

    pub fn remaining_passengers(&self) -> usize {
        self.passengers.len() - self.next
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    // ── Matching internals ────────────────────────────────────────────────

    /// Pickup travel time of every candidate, in candidate order.
    ///
    /// With the `parallel` Cargo feature the queries run on Rayon's thread
    /// pool; collection keeps candidate order, so selection is unchanged.
    fn route_candidates(&self, candidates: &[Driver], passenger: &Passenger) -> Vec<TravelTime> {
        let network = &*self.network;
        let router = &self.router;
        let query = |d: &Driver| {
            let departure = d.available_at.max(passenger.requested_at);
            router.travel_time(network, d.node, passenger.pickup, departure)
        };

        #[cfg(not(feature = "parallel"))]
        {
            candidates.iter().map(query).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            candidates.par_iter().map(query).collect()
        }
    }

    fn unroutable<O: DispatchObserver>(
        &mut self,
        candidates: Vec<Driver>,
        passenger:  &Passenger,
        observer:   &mut O,
    ) -> Step {
        warn!(
            passenger = %passenger.id,
            pickup = %passenger.pickup,
            dropoff = %passenger.dropoff,
            candidates = candidates.len(),
            "no route for passenger; skipped"
        );
        for d in candidates {
            self.queue.push(d);
        }
        self.metrics.unroutable_passengers += 1;
        observer.on_unroutable(passenger);
        Step::Unroutable(passenger.id)
    }
}

/// Index and minutes of the fastest reachable candidate; first wins ties.
fn fastest(times: &[TravelTime]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, t) in times.iter().enumerate() {
        if let Some(m) = t.minutes()
            && best.is_none_or(|(_, b)| m < b)
        {
            best = Some((i, m));
        }
    }
    best
}
