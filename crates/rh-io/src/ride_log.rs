//! `RideLogWriter<W>`: writes one CSV row per completed ride.
//!
//! Node columns hold the ids from `node_data.json`, not the network's dense
//! indices, so rows can be joined back to the source data.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use csv::Writer;

use rh_dispatch::{DispatchObserver, RideRecord, RunOutcome};
use rh_spatial::RoadNetwork;

use crate::{OutputError, OutputResult};

pub const RIDE_LOG_HEADER: [&str; 13] = [
    "passenger_id",
    "driver_id",
    "requested_at",
    "dispatched_at",
    "picked_up_at",
    "dropped_off_at",
    "pickup_node",
    "dropoff_node",
    "pickup_minutes",
    "drive_minutes",
    "wait_minutes",
    "idle_minutes",
    "profit_minutes",
];

/// A [`DispatchObserver`] that appends every ride to a CSV file.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After `dispatcher.run()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct RideLogWriter<W: Write> {
    writer:     Writer<W>,
    network:    Arc<RoadNetwork>,
    rows:       u64,
    finished:   bool,
    last_error: Option<OutputError>,
}

impl RideLogWriter<File> {
    /// Create (or truncate) the file at `path` and write the header row.
    pub fn create(path: &Path, network: Arc<RoadNetwork>) -> OutputResult<Self> {
        Self::from_writer(File::create(path)?, network)
    }
}

impl<W: Write> RideLogWriter<W> {
    /// `network` must be the one the logged rides were dispatched on.
    pub fn from_writer(inner: W, network: Arc<RoadNetwork>) -> OutputResult<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(RIDE_LOG_HEADER)?;
        Ok(Self { writer, network, rows: 0, finished: false, last_error: None })
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn write_ride(&mut self, ride: &RideRecord) -> OutputResult<()> {
        self.writer.write_record(&[
            ride.passenger.0.to_string(),
            ride.driver.0.to_string(),
            ride.requested_at.to_string(),
            ride.dispatched_at.to_string(),
            ride.picked_up_at.to_string(),
            ride.dropped_off_at.to_string(),
            self.network.source_id(ride.pickup_node).to_string(),
            self.network.source_id(ride.dropoff_node).to_string(),
            ride.pickup_minutes.to_string(),
            ride.drive_minutes.to_string(),
            ride.wait_minutes.to_string(),
            ride.idle_minutes.to_string(),
            ride.profit_minutes().to_string(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush and unwrap the underlying sink.
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer.into_inner().map_err(|e| OutputError::Io(e.into_error()))
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: Write> DispatchObserver for RideLogWriter<W> {
    fn on_ride(&mut self, ride: &RideRecord) {
        let result = self.write_ride(ride);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _outcome: &RunOutcome) {
        let result = self.finish();
        self.store_err(result);
    }
}
