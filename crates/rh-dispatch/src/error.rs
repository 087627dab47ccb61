use rh_core::{DataError, GeoPoint, NodeId, PassengerId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("no road node near {what} at {pos}")]
    Unsnappable { what: &'static str, pos: GeoPoint },

    #[error("{what} references {node}, but the network has {node_count} nodes")]
    NodeOutOfRange {
        what:       &'static str,
        node:       NodeId,
        node_count: usize,
    },

    #[error("passenger {passenger} requested at {requested_at}, before the preceding request at {previous}")]
    UnsortedPassengers {
        passenger:    PassengerId,
        requested_at: Timestamp,
        previous:     Timestamp,
    },
}

pub type DispatchResult<T> = Result<T, DispatchError>;
