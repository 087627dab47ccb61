//! `rh-dispatch`: online driver/passenger matching over a road network.
//!
//! # Matching loop
//!
//! ```text
//! for passenger in passengers (sorted by request time):
//!   ① Gather  : pop every driver free at the request time, or the single
//!                earliest driver if nobody is free yet.
//!                No drivers at all → Exhausted (terminal).
//!   ② Route   : pickup time per candidate (parallel with `parallel`);
//!                fastest reachable candidate wins.
//!   ③ Ride    : advance the winner through pickup and dropoff; record
//!                wait, idle and profit minutes.
//!   ④ Requeue: losers unchanged; winner unless it drops out.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Candidate routing and batch runs on Rayon's thread pool. |
//! | `serde`    | Serialize/deserialize config, metrics and ride records.  |
//!
//! With `parallel` on, candidates are still compared in pop order and batch
//! outcomes come back in seed order, so results match the sequential build.
//! The test suite checks this; run it both ways:
//!
//! ```text
//! cargo test -p rh-dispatch
//! cargo test -p rh-dispatch --features parallel
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rh_dispatch::{DispatchBuilder, NoopObserver, snap_drivers, snap_passengers};
//! use rh_spatial::{DijkstraRouter, GridIndex, RoadNetwork, DEFAULT_PARTITIONS};
//!
//! let network = Arc::new(RoadNetwork::from_records(&nodes, &edges)?);
//! let grid = GridIndex::build(&network, DEFAULT_PARTITIONS)?;
//! let mut dispatcher = DispatchBuilder::new(network, DijkstraRouter)
//!     .drivers(snap_drivers(&driver_records, &grid)?)
//!     .passengers(snap_passengers(&passenger_records, &grid)?)
//!     .build()?;
//! let outcome = dispatcher.run(&mut NoopObserver);
//! ```

pub mod batch;
pub mod builder;
pub mod config;
pub mod error;
pub mod fleet;
pub mod metrics;
pub mod observer;
pub mod queue;
pub mod sim;


pub use batch::run_batch;
pub use builder::DispatchBuilder;
pub use config::{DEFAULT_SEED, DispatchConfig, DropoutPolicy, EXPECTED_RIDES_PER_DRIVER};
pub use error::{DispatchError, DispatchResult};
pub use fleet::{Driver, Passenger, snap_drivers, snap_passengers};
pub use metrics::{Metrics, RunOutcome, RunStatus};
pub use observer::{DispatchObserver, NoopObserver, RideRecord};
pub use queue::DriverQueue;
pub use sim::{Dispatcher, Step};
