//! Pre-parsed input records.
//!
//! These are the shapes the loading layer hands to the simulator.  They carry
//! raw coordinates and source ids; snapping to road nodes happens later, in
//! the dispatch builder.

use crate::{DriverId, GeoPoint, PassengerId, Timestamp};

/// A road-network node as found in the source data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRecord {
    /// Stable id from the source data.  Need not be dense.
    pub id:  u64,
    pub pos: GeoPoint,
}

/// A directed road segment with hourly speed tables.
///
/// `length` is in network distance units (miles in the reference data) and
/// speeds are distance units per hour.  Both tables must hold exactly 24
/// positive entries; this is checked when the network is built, not here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub from_id:       u64,
    pub to_id:         u64,
    pub length:        f64,
    pub weekday_speed: Vec<f64>,
    pub weekend_speed: Vec<f64>,
}

impl EdgeRecord {
    /// An edge whose speed is `speed` at every hour of every day.
    pub fn constant_speed(from_id: u64, to_id: u64, length: f64, speed: f64) -> Self {
        Self {
            from_id,
            to_id,
            length,
            weekday_speed: vec![speed; crate::HOURS_PER_DAY],
            weekend_speed: vec![speed; crate::HOURS_PER_DAY],
        }
    }
}

/// A driver coming online at `timestamp` near `pos`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverRecord {
    pub id:        DriverId,
    pub timestamp: Timestamp,
    pub pos:       GeoPoint,
}

/// A ride request from `start` to `end` issued at `timestamp`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassengerRecord {
    pub id:        PassengerId,
    pub timestamp: Timestamp,
    pub start:     GeoPoint,
    pub end:       GeoPoint,
}
