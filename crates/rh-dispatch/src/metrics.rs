//! Run metrics and the final outcome.
//!
//! Only raw sums and counts are kept here.  Averages (and what to print for
//! a zero divisor) are the reporting layer's business.

use crate::observer::RideRecord;

/// Running totals of one dispatch run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// Sum of per-passenger wait minutes (queueing + pickup + drive).
    pub passenger_wait_total:   f64,
    pub passenger_wait_samples: u64,

    /// Sum of per-match driver idle minutes.
    pub driver_idle_total:      f64,
    pub driver_idle_samples:    u64,

    /// Sum of `drive - pickup` over all rides.
    pub ride_profit_total:      f64,
    pub rides_completed:        u64,

    /// Drivers loaded at the start of the run.
    pub driver_count:           usize,
    /// Passengers never matched because no driver was left.
    pub unmatched_passengers:   u64,
    /// Passengers skipped because no path connected them to a driver or to
    /// their destination.
    pub unroutable_passengers:  u64,
    /// Drivers retired by the dropout policy.
    pub dropped_drivers:        u64,
}

impl Metrics {
    pub(crate) fn record_ride(&mut self, ride: &RideRecord) {
        self.passenger_wait_total += ride.wait_minutes;
        self.passenger_wait_samples += 1;
        self.driver_idle_total += ride.idle_minutes;
        self.driver_idle_samples += 1;
        self.ride_profit_total += ride.profit_minutes();
        self.rides_completed += 1;
    }
}

/// How a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunStatus {
    /// Every passenger was processed.
    Completed,
    /// The driver queue emptied with `unmatched` passengers still waiting.
    DriversExhausted { unmatched: usize },
}

/// Final status plus metrics, returned by [`Dispatcher::run`](crate::Dispatcher::run).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunOutcome {
    pub status:  RunStatus,
    pub metrics: Metrics,
}
