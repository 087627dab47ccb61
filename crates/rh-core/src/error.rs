//! Input-data error type.
//!
//! Every variant is fatal: it means the records handed to the simulator are
//! malformed and no run can start.  Sub-crates wrap `DataError` as one
//! variant of their own error enums via `#[from]`.

use thiserror::Error;

use crate::DayKind;

/// Malformed or inconsistent input data.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("road network has no nodes")]
    NoNodes,

    #[error("road network has no edges")]
    NoEdges,

    #[error("node id {0} appears more than once")]
    DuplicateNode(u64),

    #[error("node id {0} has non-finite coordinates")]
    NonFiniteCoordinate(u64),

    #[error("edge {from} -> {to} references unknown node id {missing}")]
    UnknownNode { from: u64, to: u64, missing: u64 },

    #[error("edge {from} -> {to} has invalid length {length}")]
    InvalidLength { from: u64, to: u64, length: f64 },

    #[error("edge {from} -> {to} {day} speed table has {len} entries, expected 24")]
    SpeedTableLength { from: u64, to: u64, day: DayKind, len: usize },

    #[error("edge {from} -> {to} {day} speed at hour {hour} is {speed}, must be positive")]
    InvalidSpeed { from: u64, to: u64, day: DayKind, hour: usize, speed: f64 },

    #[error("degenerate bounding box: every node shares {axis} {value}")]
    DegenerateBounds { axis: &'static str, value: f64 },

    #[error("spatial grid needs at least one partition")]
    ZeroPartitions,

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Shorthand result type for data validation.
pub type DataResult<T> = Result<T, DataError>;
