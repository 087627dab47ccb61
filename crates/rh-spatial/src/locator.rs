//! Nearest-node lookup strategies.
//!
//! The dispatch builder snaps driver and passenger coordinates to road nodes
//! through the [`NodeLocator`] trait, so the snapping strategy is a
//! compile-time choice:
//!
//! | Locator          | Answer                          | Backing          |
//! |------------------|---------------------------------|------------------|
//! | [`GridIndex`]    | nearest in first non-empty ring | bucket grid      |
//! | [`ExactLocator`] | true nearest node               | R-tree (`rstar`) |

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use rh_core::{GeoPoint, NodeId};

use crate::grid::GridIndex;
use crate::network::RoadNetwork;

/// Maps a coordinate to a road node.
pub trait NodeLocator: Send + Sync {
    /// The node `pos` should be anchored to.
    ///
    /// `None` for an empty index or a non-finite `pos`.
    fn nearest(&self, pos: GeoPoint) -> Option<NodeId>;
}

impl NodeLocator for GridIndex {
    fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        GridIndex::nearest(self, pos)
    }
}

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[lat, lon]` point with its `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space, the same metric the grid
    /// uses.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── ExactLocator ──────────────────────────────────────────────────────────────

/// Exact nearest-node lookup over an R-tree of all network nodes.
pub struct ExactLocator {
    tree: RTree<NodeEntry>,
}

impl ExactLocator {
    /// Bulk-load every node of `network`.  O(N log N).
    pub fn build(network: &RoadNetwork) -> Self {
        let entries: Vec<NodeEntry> = network
            .node_pos
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id:    NodeId(i as u32),
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }
}

impl NodeLocator for ExactLocator {
    fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        if !pos.is_finite() {
            return None;
        }
        self.tree.nearest_neighbor(&[pos.lat, pos.lon]).map(|e| e.id)
    }
}
