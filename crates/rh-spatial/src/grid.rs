//! Bucket-grid spatial index for nearest-node snapping.
//!
//! # Layout
//!
//! The network's bounding box is cut into an `m x m` grid with
//! `m = ceil(sqrt(partition_count))`.  Each cell holds the nodes whose
//! coordinates fall inside it, in `NodeId` order.  Cells are stored row-major
//! by latitude index.
//!
//! # Query
//!
//! [`GridIndex::nearest`] starts at the query's home cell and widens in
//! square rings until at least one node has been seen, then returns the
//! closest node (straight-line distance in degree space) among everything
//! collected so far.  Radius 1 covers the 3x3 block around the home cell;
//! each further radius adds the cells exactly that Chebyshev distance away.
//!
//! This is an approximation: a node in the next ring can be closer than the
//! best candidate of the first non-empty ring.  Use
//! [`ExactLocator`](crate::ExactLocator) when exact answers matter more than
//! speed.

use tracing::debug;

use rh_core::{DataError, DataResult, GeoPoint, NodeId};

use crate::network::RoadNetwork;

/// Partition count used when none is configured: a 30 x 30 grid.
pub const DEFAULT_PARTITIONS: usize = 900;

/// `m x m` bucket grid over the network's bounding box.
pub struct GridIndex {
    dim:      usize,
    min:      GeoPoint,
    lat_span: f64,
    lon_span: f64,
    /// Row-major cells; each entry carries the node position so queries
    /// never touch the network.
    cells:    Vec<Vec<(NodeId, GeoPoint)>>,
}

impl GridIndex {
    /// Bucket every node of `network` into a grid of about `partition_count`
    /// cells.
    ///
    /// Fails if `partition_count` is zero, or if all nodes share a latitude
    /// or a longitude (a degenerate bounding box).  A single-node network is
    /// accepted: every query resolves to that node.
    pub fn build(network: &RoadNetwork, partition_count: usize) -> DataResult<Self> {
        if partition_count == 0 {
            return Err(DataError::ZeroPartitions);
        }
        if network.node_count() == 0 {
            return Err(DataError::NoNodes);
        }
        let dim = (partition_count as f64).sqrt().ceil() as usize;

        let mut min = GeoPoint::new(f64::INFINITY, f64::INFINITY);
        let mut max = GeoPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &network.node_pos {
            min.lat = min.lat.min(p.lat);
            min.lon = min.lon.min(p.lon);
            max.lat = max.lat.max(p.lat);
            max.lon = max.lon.max(p.lon);
        }

        let (lat_span, lon_span) = if network.node_count() == 1 {
            (1.0, 1.0)
        } else {
            (axis_span("latitude", min.lat, max.lat)?, axis_span("longitude", min.lon, max.lon)?)
        };

        let mut grid = Self {
            dim,
            min,
            lat_span,
            lon_span,
            cells: vec![Vec::new(); dim * dim],
        };
        for (i, &pos) in network.node_pos.iter().enumerate() {
            let (row, col) = grid.cell_of(pos);
            grid.cells[row * dim + col].push((NodeId(i as u32), pos));
        }

        debug!(
            dim,
            occupied = grid.cells.iter().filter(|c| !c.is_empty()).count(),
            "spatial grid built"
        );
        Ok(grid)
    }

    /// Cells per axis (`m`).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Home cell `(lat_index, lon_index)` of `pos`, clamped into the grid.
    ///
    /// Points on the upper edge of the bounding box, or outside it, land in
    /// the nearest boundary cell.
    pub fn cell_of(&self, pos: GeoPoint) -> (usize, usize) {
        (
            self.axis_index(pos.lat, self.min.lat, self.lat_span),
            self.axis_index(pos.lon, self.min.lon, self.lon_span),
        )
    }

    /// Nodes bucketed in cell `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.cells[row * self.dim + col].iter().map(|&(id, _)| id)
    }

    /// Nearest node to `pos` found by ring search (see module docs).
    ///
    /// Ties go to the first node encountered.  Returns `None` for a
    /// non-finite `pos`; `build` rules out an empty grid.
    pub fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        if !pos.is_finite() {
            return None;
        }
        let (row, col) = self.cell_of(pos);
        let mut best: Option<(f64, NodeId)> = None;

        for radius in 1..=self.dim {
            for (r, c) in self.ring(row, col, radius) {
                for &(id, node_pos) in &self.cells[r * self.dim + c] {
                    let d = node_pos.degree_distance(pos);
                    if best.is_none_or(|(best_d, _)| d < best_d) {
                        best = Some((d, id));
                    }
                }
            }
            if best.is_some() {
                break;
            }
        }

        best.map(|(_, id)| id)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn axis_index(&self, value: f64, min: f64, span: f64) -> usize {
        let raw = (self.dim as f64 * (value - min) / span).floor();
        // Out-of-range values saturate before the clamp.
        (raw as i64).clamp(0, self.dim as i64 - 1) as usize
    }

    /// In-grid cells of the ring at `radius` around `(row, col)`, row-major.
    fn ring(&self, row: usize, col: usize, radius: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let r = radius as i64;
        let (row, col) = (row as i64, col as i64);
        let dim = self.dim as i64;
        (-r..=r)
            .flat_map(move |di| (-r..=r).map(move |dj| (di, dj)))
            .filter(move |&(di, dj)| radius == 1 || di.abs().max(dj.abs()) == r)
            .map(move |(di, dj)| (row + di, col + dj))
            .filter(move |&(i, j)| (0..dim).contains(&i) && (0..dim).contains(&j))
            .map(|(i, j)| (i as usize, j as usize))
    }
}

fn axis_span(axis: &'static str, min: f64, max: f64) -> DataResult<f64> {
    let span = max - min;
    if span > 0.0 {
        Ok(span)
    } else {
        Err(DataError::DegenerateBounds { axis, value: min })
    }
}
