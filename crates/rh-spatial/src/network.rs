//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length`, `edge_speed`) are
//! sorted by source node and indexed by `EdgeId`.  Iteration over a node's
//! outgoing edges is therefore a contiguous memory scan, ideal for the
//! router's inner loop.  Edges of one source node keep their input order.
//!
//! # Time-dependent costs
//!
//! Each edge carries a [`SpeedProfile`]: one speed per hour of day for
//! weekdays and one for weekends.  The travel time of an edge depends on the
//! moment the vehicle enters it:
//!
//! ```text
//! minutes = 60 * length / speed[day_kind(t)][hour(t)]
//! ```
//!
//! Speed tables are validated once in [`RoadNetworkBuilder::build`], so
//! [`RoadNetwork::edge_travel_time`] is total afterwards.

use rustc_hash::FxHashMap;
use tracing::debug;

use rh_core::{
    DataError, DataResult, DayKind, EdgeId, EdgeRecord, GeoPoint, HOURS_PER_DAY, NodeId,
    NodeRecord, Timestamp,
};

// ── SpeedProfile ──────────────────────────────────────────────────────────────

/// Hourly speeds of one edge, in distance units per hour.
///
/// Every entry is finite and strictly positive (checked at construction).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedProfile {
    weekday: [f64; HOURS_PER_DAY],
    weekend: [f64; HOURS_PER_DAY],
}

impl SpeedProfile {
    /// Validate the two speed tables of `record`.
    pub fn from_record(record: &EdgeRecord) -> DataResult<Self> {
        Ok(Self {
            weekday: validate_table(record, DayKind::Weekday, &record.weekday_speed)?,
            weekend: validate_table(record, DayKind::Weekend, &record.weekend_speed)?,
        })
    }

    /// Speed in effect when departing at `t`.
    #[inline]
    pub fn at(&self, t: Timestamp) -> f64 {
        match t.day_kind() {
            DayKind::Weekday => self.weekday[t.hour()],
            DayKind::Weekend => self.weekend[t.hour()],
        }
    }

    /// All 48 entries, weekday table first.
    pub fn entries(&self) -> impl Iterator<Item = f64> + '_ {
        self.weekday.iter().chain(self.weekend.iter()).copied()
    }
}

fn validate_table(record: &EdgeRecord, day: DayKind, speeds: &[f64]) -> DataResult<[f64; HOURS_PER_DAY]> {
    let table: [f64; HOURS_PER_DAY] = speeds.try_into().map_err(|_| DataError::SpeedTableLength {
        from: record.from_id,
        to:   record.to_id,
        day,
        len:  speeds.len(),
    })?;
    if let Some((hour, &speed)) = table
        .iter()
        .enumerate()
        .find(|&(_, &s)| !(s.is_finite() && s > 0.0))
    {
        return Err(DataError::InvalidSpeed {
            from: record.from_id,
            to: record.to_id,
            day,
            hour,
            speed,
        });
    }
    Ok(table)
}

/// Minutes needed to cover `length` at `speed` (distance units per hour).
#[inline]
pub fn travel_minutes(length: f64, speed: f64) -> f64 {
    60.0 * length / speed
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed, time-dependent road graph in CSR format.
///
/// Immutable once built and `Send + Sync`, so one instance can be shared (for
/// example behind an `Arc`) by any number of routing queries and dispatch
/// runs.  Do not construct directly; use [`RoadNetworkBuilder`] or
/// [`RoadNetwork::from_records`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Id of each node in the source data.  Indexed by `NodeId`.
    pub node_source_id: Vec<u64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Needed to trace a route backwards.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in network distance units.
    pub edge_length: Vec<f64>,

    /// Hourly speed tables of each edge.
    pub edge_speed: Vec<SpeedProfile>,

    source_index:  FxHashMap<u64, NodeId>,
    average_speed: f64,
}

impl RoadNetwork {
    /// Build a network straight from loader records.
    pub fn from_records(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> DataResult<Self> {
        let mut b = RoadNetworkBuilder::with_capacity(nodes.len(), edges.len());
        for node in nodes {
            b.add_node(node.id, node.pos)?;
        }
        for edge in edges {
            b.add_directed_edge(edge)?;
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range with no heap allocation.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Minutes needed to traverse `edge` when entering it at `departure`.
    #[inline]
    pub fn edge_travel_time(&self, edge: EdgeId, departure: Timestamp) -> f64 {
        let speed = self.edge_speed[edge.index()].at(departure);
        travel_minutes(self.edge_length[edge.index()], speed)
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// Translate a source-data node id into the network's dense `NodeId`.
    pub fn node_by_source_id(&self, source_id: u64) -> Option<NodeId> {
        self.source_index.get(&source_id).copied()
    }

    #[inline]
    pub fn source_id(&self, node: NodeId) -> u64 {
        self.node_source_id[node.index()]
    }

    /// Mean of every weekday and weekend speed entry of every edge.
    ///
    /// Computed once at build time; used as the A* heuristic's speed.
    #[inline]
    pub fn average_speed(&self) -> f64 {
        self.average_speed
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// Nodes must be added before the edges that reference them.  `build()`
/// sorts edges by source node (stable, so per-node input order survives) and
/// constructs the CSR arrays.
///
/// # Example
///
/// ```
/// use rh_core::{EdgeRecord, GeoPoint};
/// use rh_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// b.add_node(10, GeoPoint::new(40.75, -73.99)).unwrap();
/// b.add_node(11, GeoPoint::new(40.76, -73.98)).unwrap();
/// b.add_road(&EdgeRecord::constant_speed(10, 11, 0.8, 20.0)).unwrap();
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // both directions
/// ```
pub struct RoadNetworkBuilder {
    nodes:        Vec<GeoPoint>,
    source_ids:   Vec<u64>,
    source_index: FxHashMap<u64, NodeId>,
    raw_edges:    Vec<RawEdge>,
}

struct RawEdge {
    from:   NodeId,
    to:     NodeId,
    length: f64,
    speed:  SpeedProfile,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut source_index = FxHashMap::default();
        source_index.reserve(nodes);
        Self {
            nodes: Vec::with_capacity(nodes),
            source_ids: Vec::with_capacity(nodes),
            source_index,
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, source_id: u64, pos: GeoPoint) -> DataResult<NodeId> {
        if !pos.is_finite() {
            return Err(DataError::NonFiniteCoordinate(source_id));
        }
        if self.source_index.contains_key(&source_id) {
            return Err(DataError::DuplicateNode(source_id));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.source_index.insert(source_id, id);
        self.nodes.push(pos);
        self.source_ids.push(source_id);
        Ok(id)
    }

    /// Add the **directed** edge described by `record`.
    pub fn add_directed_edge(&mut self, record: &EdgeRecord) -> DataResult<()> {
        let lookup = |id: u64| {
            self.source_index.get(&id).copied().ok_or(DataError::UnknownNode {
                from:    record.from_id,
                to:      record.to_id,
                missing: id,
            })
        };
        let from = lookup(record.from_id)?;
        let to = lookup(record.to_id)?;
        if !(record.length.is_finite() && record.length >= 0.0) {
            return Err(DataError::InvalidLength {
                from:   record.from_id,
                to:     record.to_id,
                length: record.length,
            });
        }
        let speed = SpeedProfile::from_record(record)?;
        self.raw_edges.push(RawEdge { from, to, length: record.length, speed });
        Ok(())
    }

    /// Convenience: add `record` and its reverse (same length and speeds) for
    /// a logically undirected road.
    pub fn add_road(&mut self, record: &EdgeRecord) -> DataResult<()> {
        self.add_directed_edge(record)?;
        let reverse = EdgeRecord {
            from_id: record.to_id,
            to_id: record.from_id,
            ..record.clone()
        };
        self.add_directed_edge(&reverse)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Fails if no nodes or no edges were added.
    pub fn build(self) -> DataResult<RoadNetwork> {
        if self.nodes.is_empty() {
            return Err(DataError::NoNodes);
        }
        if self.raw_edges.is_empty() {
            return Err(DataError::NoEdges);
        }
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let speed_entries = (edge_count * 2 * HOURS_PER_DAY) as f64;
        let average_speed = raw.iter().flat_map(|e| e.speed.entries()).sum::<f64>() / speed_entries;

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from   = Vec::with_capacity(edge_count);
        let mut edge_to     = Vec::with_capacity(edge_count);
        let mut edge_length = Vec::with_capacity(edge_count);
        let mut edge_speed  = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length.push(e.length);
            edge_speed.push(e.speed);
        }

        debug!(nodes = node_count, edges = edge_count, average_speed, "road network built");

        Ok(RoadNetwork {
            node_pos: self.nodes,
            node_source_id: self.source_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_length,
            edge_speed,
            source_index: self.source_index,
            average_speed,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
