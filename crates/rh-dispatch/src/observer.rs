//! Dispatch observer trait for progress reporting and data collection.

use rh_core::{DriverId, NodeId, PassengerId, Timestamp};

use crate::fleet::{Driver, Passenger};
use crate::metrics::RunOutcome;

/// Everything known about one completed ride.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideRecord {
    pub passenger:      PassengerId,
    pub driver:         DriverId,
    pub requested_at:   Timestamp,
    /// When the driver left for the pickup.
    pub dispatched_at:  Timestamp,
    pub picked_up_at:   Timestamp,
    pub dropped_off_at: Timestamp,
    pub pickup_node:    NodeId,
    pub dropoff_node:   NodeId,
    /// Deadhead minutes from the driver's node to the pickup.
    pub pickup_minutes: f64,
    pub drive_minutes:  f64,
    /// Minutes from request to dropoff.
    pub wait_minutes:   f64,
    /// Minutes the driver sat free before this request arrived.
    pub idle_minutes:   f64,
}

impl RideRecord {
    /// Paid minutes minus deadhead minutes.
    pub fn profit_minutes(&self) -> f64 {
        self.drive_minutes - self.pickup_minutes
    }
}

/// Callbacks invoked by [`Dispatcher::run`](crate::Dispatcher::run) and
/// [`Dispatcher::step`](crate::Dispatcher::step).
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: ride counter
///
/// ```rust
/// use rh_dispatch::{DispatchObserver, RideRecord};
///
/// struct RideCounter(usize);
///
/// impl DispatchObserver for RideCounter {
///     fn on_ride(&mut self, _ride: &RideRecord) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// Called once before the first passenger is processed.
    fn on_run_start(&mut self, _drivers: usize, _passengers: usize) {}

    /// Called after each completed ride.
    fn on_ride(&mut self, _ride: &RideRecord) {}

    /// Called when `passenger` is skipped because no route exists.
    fn on_unroutable(&mut self, _passenger: &Passenger) {}

    /// Called when `driver` leaves the fleet after a ride.
    fn on_dropout(&mut self, _driver: &Driver) {}

    /// Called once if the driver queue empties before the passengers do.
    fn on_exhausted(&mut self, _unmatched: usize) {}

    /// Called once after the last passenger.
    fn on_run_end(&mut self, _outcome: &RunOutcome) {}
}

/// A [`DispatchObserver`] that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}
