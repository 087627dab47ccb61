//! Human-readable run summary.

use std::fmt;

use serde::Serialize;

use rh_dispatch::{Metrics, RunOutcome, RunStatus};

/// Averages and totals derived from a run's raw [`Metrics`].
///
/// An average over zero samples is `None` and prints as `n/a`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub rides:                  u64,
    pub drivers:                usize,
    pub average_passenger_wait: Option<f64>,
    pub average_driver_idle:    Option<f64>,
    pub total_driver_profit:    f64,
    /// Total profit spread over every driver loaded, retired ones included.
    pub average_driver_profit:  Option<f64>,
    pub unmatched_passengers:   u64,
    pub unroutable_passengers:  u64,
    pub dropped_drivers:        u64,
    pub drivers_exhausted:      bool,
}

impl Summary {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self {
            rides:                  metrics.rides_completed,
            drivers:                metrics.driver_count,
            average_passenger_wait: mean(metrics.passenger_wait_total, metrics.passenger_wait_samples),
            average_driver_idle:    mean(metrics.driver_idle_total, metrics.driver_idle_samples),
            total_driver_profit:    metrics.ride_profit_total,
            average_driver_profit:  mean(metrics.ride_profit_total, metrics.driver_count as u64),
            unmatched_passengers:   metrics.unmatched_passengers,
            unroutable_passengers:  metrics.unroutable_passengers,
            dropped_drivers:        metrics.dropped_drivers,
            drivers_exhausted:      false,
        }
    }

    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        Self {
            drivers_exhausted: matches!(outcome.status, RunStatus::DriversExhausted { .. }),
            ..Self::from_metrics(&outcome.metrics)
        }
    }
}

fn mean(total: f64, samples: u64) -> Option<f64> {
    (samples > 0).then(|| total / samples as f64)
}

struct Minutes(Option<f64>);

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(m) => write!(f, "{m:.2} minutes"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.drivers_exhausted {
            writeln!(f, "No more drivers available. Remaining passengers: {}", self.unmatched_passengers)?;
        }
        writeln!(f, "Rides Completed: {}", self.rides)?;
        writeln!(f, "Average Passenger Wait Time: {}", Minutes(self.average_passenger_wait))?;
        writeln!(f, "Average Driver Idle Time: {}", Minutes(self.average_driver_idle))?;
        writeln!(f, "Total Driver Profit: {}", Minutes(Some(self.total_driver_profit)))?;
        write!(f, "Average Driver Profit: {}", Minutes(self.average_driver_profit))?;
        if self.unroutable_passengers > 0 {
            write!(f, "\nUnroutable Passengers: {}", self.unroutable_passengers)?;
        }
        if self.dropped_drivers > 0 {
            write!(f, "\nDrivers Dropped Out: {}", self.dropped_drivers)?;
        }
        Ok(())
    }
}
