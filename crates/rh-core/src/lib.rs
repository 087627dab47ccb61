//! `rh-core`: foundational types for the ride-hailing dispatch simulator.
//!
//! This crate is a dependency of every other `rh-*` crate.  It has no `rh-*`
//! dependencies and few external ones (`chrono`, `rand`, `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeId`, `DriverId`, `PassengerId`            |
//! | [`geo`]       | `GeoPoint`, degree and planar-mile distances             |
//! | [`time`]      | `Timestamp`, `DayKind`, `HOURS_PER_DAY`                  |
//! | [`rng`]       | `SimRng` (seedable, injectable)                          |
//! | [`records`]   | Pre-parsed node / edge / driver / passenger records      |
//! | [`error`]     | `DataError`, `DataResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod records;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DataError, DataResult};
pub use geo::{GeoPoint, LAT_TO_MILES, LON_TO_MILES};
pub use ids::{DriverId, EdgeId, NodeId, PassengerId};
pub use records::{DriverRecord, EdgeRecord, NodeRecord, PassengerRecord};
pub use rng::SimRng;
pub use time::{DayKind, HOURS_PER_DAY, Timestamp};
