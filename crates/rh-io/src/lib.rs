//! `rh-io`: everything between the dispatch core and the filesystem.
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`loader`]   | JSON/CSV dataset readers, [`load_dataset`]               |
//! | [`ride_log`] | [`RideLogWriter`], a `DispatchObserver` writing CSV rows |
//! | [`report`]   | [`Summary`] of a run's metrics                           |
//!
//! # Usage
//!
//! ```rust,ignore
//! use rh_io::{load_dataset, RideLogWriter, Summary};
//!
//! let data = load_dataset(Path::new("./data"))?;
//! // ... build network, snap, build dispatcher ...
//! let mut log = RideLogWriter::create(Path::new("rides.csv"), Arc::clone(&network))?;
//! let outcome = dispatcher.run(&mut log);
//! if let Some(e) = log.take_error() { eprintln!("ride log error: {e}"); }
//! println!("{}", Summary::from_outcome(&outcome));
//! ```

pub mod error;
pub mod loader;
pub mod report;
pub mod ride_log;


pub use error::{LoadError, LoadResult, OutputError, OutputResult};
pub use loader::{
    Dataset, load_dataset, load_drivers, load_drivers_reader, load_edges, load_edges_reader,
    load_nodes, load_nodes_reader, load_passengers, load_passengers_reader,
};
pub use report::Summary;
pub use ride_log::RideLogWriter;
