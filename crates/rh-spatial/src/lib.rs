//! `rh-spatial`: time-dependent road network, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR), `RoadNetworkBuilder`, `SpeedProfile`    |
//! | [`grid`]    | `GridIndex` bucket grid, `DEFAULT_PARTITIONS`                |
//! | [`locator`] | `NodeLocator` trait, `ExactLocator` (R-tree)                 |
//! | [`router`]  | `Router` trait, `TravelTime`, `Route`, Dijkstra and A*       |
//!
//! Build failures are reported as [`rh_core::DataError`]; an unreachable
//! destination is a normal [`TravelTime::Unreachable`] result.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod grid;
pub mod locator;
pub mod network;
pub mod router;

#[cfg(test)]
mod tests;

pub use grid::{DEFAULT_PARTITIONS, GridIndex};
pub use locator::{ExactLocator, NodeLocator};
pub use network::{RoadNetwork, RoadNetworkBuilder, SpeedProfile, travel_minutes};
pub use router::{AStarRouter, DijkstraRouter, Route, Router, TravelTime};
