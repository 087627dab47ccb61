//! Simulation time model.
//!
//! # Design
//!
//! Every clock in the simulator (driver availability, passenger request,
//! edge departure) is an absolute calendar time without a zone.  Only two
//! calendar facts matter to the road network: the hour of day (0–23) and
//! whether the day is a weekday or a weekend day.  Holidays are not
//! modelled.
//!
//! Durations are carried as `f64` minutes throughout the simulator.  Adding
//! minutes to a `Timestamp` rounds to the nearest microsecond.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::{DataError, DataResult};

/// Number of hourly entries in an edge speed table.
pub const HOURS_PER_DAY: usize = 24;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

// ── DayKind ──────────────────────────────────────────────────────────────────

/// Which speed table applies on a given day.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayKind {
    /// Monday through Friday.
    Weekday,
    /// Saturday and Sunday.
    Weekend,
}

impl DayKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DayKind::Weekday => "weekday",
            DayKind::Weekend => "weekend",
        }
    }
}

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Timestamp ────────────────────────────────────────────────────────────────

/// An absolute simulation time.
///
/// Ordered chronologically, so it can key priority queues directly.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    /// Format used by the trip and driver data files: `01/05/2015 08:00:00`.
    pub const FORMAT: &'static str = "%m/%d/%Y %H:%M:%S";

    #[inline]
    pub fn new(inner: NaiveDateTime) -> Self {
        Self(inner)
    }

    /// Build from calendar components.  Returns `None` for an invalid date or
    /// time of day.
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, min, sec)
            .map(Self)
    }

    /// Parse a timestamp in [`Timestamp::FORMAT`].
    pub fn parse(s: &str) -> DataResult<Self> {
        NaiveDateTime::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|e| DataError::InvalidTimestamp {
                value:  s.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Hour of day, `0..24`.  Indexes edge speed tables.
    #[inline]
    pub fn hour(self) -> usize {
        self.0.hour() as usize
    }

    #[inline]
    pub fn day_kind(self) -> DayKind {
        if self.0.weekday().num_days_from_monday() >= 5 {
            DayKind::Weekend
        } else {
            DayKind::Weekday
        }
    }

    /// The time `minutes` after `self` (microsecond resolution).
    ///
    /// Negative values move backwards.  Saturates at the representable range
    /// instead of panicking.
    pub fn plus_minutes(self, minutes: f64) -> Timestamp {
        let micros = (minutes * MICROS_PER_MINUTE).round() as i64;
        let shifted = self
            .0
            .checked_add_signed(Duration::microseconds(micros))
            .unwrap_or(if micros >= 0 { NaiveDateTime::MAX } else { NaiveDateTime::MIN });
        Timestamp(shifted)
    }

    /// Signed minutes from `earlier` to `self`; negative if `earlier` is
    /// actually later.
    pub fn minutes_since(self, earlier: Timestamp) -> f64 {
        let delta = self.0 - earlier.0;
        match delta.num_microseconds() {
            Some(us) => us as f64 / MICROS_PER_MINUTE,
            None => delta.num_seconds() as f64 / 60.0,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}
