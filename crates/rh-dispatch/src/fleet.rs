//! Drivers and passengers as the dispatcher sees them: anchored to road
//! nodes instead of raw coordinates.

use rh_core::{DriverId, DriverRecord, GeoPoint, NodeId, PassengerId, PassengerRecord, Timestamp};
use rh_spatial::NodeLocator;

use crate::{DispatchError, DispatchResult};

/// A driver's mutable dispatch state.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Driver {
    pub id:           DriverId,
    /// Node the driver is parked at (or will be once the current ride ends).
    pub node:         NodeId,
    /// Earliest moment the driver can start the next pickup.
    pub available_at: Timestamp,
    /// Rides completed so far.
    pub rides:        u32,
}

impl Driver {
    pub fn new(id: DriverId, node: NodeId, available_at: Timestamp) -> Self {
        Self { id, node, available_at, rides: 0 }
    }
}

/// A ride request, consumed exactly once.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passenger {
    pub id:           PassengerId,
    pub requested_at: Timestamp,
    pub pickup:       NodeId,
    pub dropoff:      NodeId,
}

/// Anchor every driver record to its nearest road node.
///
/// Each driver becomes available at its record timestamp.
pub fn snap_drivers<L>(records: &[DriverRecord], locator: &L) -> DispatchResult<Vec<Driver>>
where
    L: NodeLocator + ?Sized,
{
    records
        .iter()
        .map(|r| {
            let node = snap(locator, "driver", r.pos)?;
            Ok(Driver::new(r.id, node, r.timestamp))
        })
        .collect()
}

/// Anchor the pickup and dropoff of every passenger record independently.
pub fn snap_passengers<L>(records: &[PassengerRecord], locator: &L) -> DispatchResult<Vec<Passenger>>
where
    L: NodeLocator + ?Sized,
{
    records
        .iter()
        .map(|r| {
            let pickup = snap(locator, "pickup", r.start)?;
            let dropoff = snap(locator, "dropoff", r.end)?;
            Ok(Passenger { id: r.id, requested_at: r.timestamp, pickup, dropoff })
        })
        .collect()
}

/// Non-finite coordinates never snap, whatever the locator would answer.
fn snap<L>(locator: &L, what: &'static str, pos: GeoPoint) -> DispatchResult<NodeId>
where
    L: NodeLocator + ?Sized,
{
    pos.is_finite()
        .then(|| locator.nearest(pos))
        .flatten()
        .ok_or(DispatchError::Unsnappable { what, pos })
}
