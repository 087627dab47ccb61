//! Routing trait and the time-dependent Dijkstra / A* implementations.
//!
//! # Pluggability
//!
//! `rh-dispatch` calls routing via the [`Router`] trait, so the dispatcher can
//! be instantiated with either [`DijkstraRouter`] or [`AStarRouter`] (or an
//! application's own engine) without touching the dispatch loop.
//!
//! # Time dependence
//!
//! Both routers evaluate every edge at the absolute moment the vehicle
//! enters it: `departure + minutes accumulated so far`.  This is exact only
//! under the FIFO assumption (leaving later never arrives earlier), which the
//! routers assume and do not check.
//!
//! # Cost units
//!
//! All costs are `f64` minutes.  A disconnected pair is not an error: it is
//! reported as [`TravelTime::Unreachable`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rh_core::{EdgeId, NodeId, Timestamp};

use crate::network::{travel_minutes, RoadNetwork};

// ── TravelTime ────────────────────────────────────────────────────────────────

/// Outcome of a shortest-time query.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelTime {
    Reachable { minutes: f64 },
    Unreachable,
}

impl TravelTime {
    #[inline]
    pub fn minutes(self) -> Option<f64> {
        match self {
            TravelTime::Reachable { minutes } => Some(minutes),
            TravelTime::Unreachable => None,
        }
    }

    #[inline]
    pub fn is_reachable(self) -> bool {
        matches!(self, TravelTime::Reachable { .. })
    }

    /// Comparison key for candidate selection: unreachable is `+inf`, so it
    /// can never beat a reachable alternative.
    #[inline]
    pub fn cost(self) -> f64 {
        self.minutes().unwrap_or(f64::INFINITY)
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A found path: the edges to traverse in order and the total travel time.
#[derive(Debug, Clone)]
pub struct Route {
    pub edges:   Vec<EdgeId>,
    pub minutes: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-time routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so candidate queries can run on
/// Rayon worker threads (`rh-dispatch` feature `parallel`).
pub trait Router: Send + Sync {
    /// Minimum travel time from `from` to `to` leaving at `departure`.
    fn travel_time(
        &self,
        network:   &RoadNetwork,
        from:      NodeId,
        to:        NodeId,
        departure: Timestamp,
    ) -> TravelTime;

    /// Like [`travel_time`](Self::travel_time) but also returns the edges.
    ///
    /// `None` if no path exists; `from == to` yields an empty route.
    fn route(
        &self,
        network:   &RoadNetwork,
        from:      NodeId,
        to:        NodeId,
        departure: Timestamp,
    ) -> Option<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Time-dependent Dijkstra over the CSR road graph.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn travel_time(&self, network: &RoadNetwork, from: NodeId, to: NodeId, departure: Timestamp) -> TravelTime {
        travel_time_of(search(network, from, to, departure, |_| 0.0))
    }

    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId, departure: Timestamp) -> Option<Route> {
        search(network, from, to, departure, |_| 0.0).map(|found| found.into_route(network, to))
    }
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Time-dependent A* guided by straight-line distance.
///
/// `h(n) = 60 * planar_miles(n, target) / network.average_speed()`.
///
/// The heuristic is **not** provably admissible: any edge slower than the
/// network-wide average can make it overestimate, in which case A* may
/// return a slightly longer time than Dijkstra.  When every edge has the same
/// constant speed (and edge lengths are at least the straight-line distance
/// between their endpoints) the heuristic is admissible and both routers
/// agree.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStarRouter;

impl Router for AStarRouter {
    fn travel_time(&self, network: &RoadNetwork, from: NodeId, to: NodeId, departure: Timestamp) -> TravelTime {
        let h = straight_line_minutes(network, to);
        travel_time_of(search(network, from, to, departure, h))
    }

    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId, departure: Timestamp) -> Option<Route> {
        let h = straight_line_minutes(network, to);
        search(network, from, to, departure, h).map(|found| found.into_route(network, to))
    }
}

fn straight_line_minutes(network: &RoadNetwork, target: NodeId) -> impl Fn(NodeId) -> f64 + '_ {
    let goal = network.node_pos(target);
    let speed = network.average_speed();
    move |node| travel_minutes(network.node_pos(node).planar_miles(goal), speed)
}

// ── Search internals ──────────────────────────────────────────────────────────

/// Heap entry ordered by `(priority, node)`; `g` rides along to detect stale
/// entries.
#[derive(Copy, Clone)]
struct Entry {
    priority: f64,
    node:     NodeId,
    g:        f64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.node.cmp(&other.node))
    }
}

struct Found {
    minutes:   f64,
    prev_edge: Vec<EdgeId>,
}

impl Found {
    fn into_route(self, network: &RoadNetwork, to: NodeId) -> Route {
        let mut edges = Vec::new();
        let mut cur = to;
        loop {
            let e = self.prev_edge[cur.index()];
            if e == EdgeId::INVALID {
                break;
            }
            edges.push(e);
            cur = network.edge_from[e.index()];
        }
        edges.reverse();
        Route { edges, minutes: self.minutes }
    }
}

fn travel_time_of(found: Option<Found>) -> TravelTime {
    match found {
        Some(f) => TravelTime::Reachable { minutes: f.minutes },
        None => TravelTime::Unreachable,
    }
}

/// Best-first search shared by both routers.  With `h ≡ 0` this is Dijkstra.
fn search<H>(
    network:   &RoadNetwork,
    from:      NodeId,
    to:        NodeId,
    departure: Timestamp,
    h:         H,
) -> Option<Found>
where
    H: Fn(NodeId) -> f64,
{
    let n = network.node_count();
    if from == to {
        return Some(Found { minutes: 0.0, prev_edge: vec![EdgeId::INVALID; n] });
    }

    // best[v] = lowest known minutes from `from` to v.
    let mut best = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    best[from.index()] = 0.0;

    // Reverse makes BinaryHeap (max) behave as min-heap; NodeId breaks ties.
    let mut heap: BinaryHeap<Reverse<Entry>> = BinaryHeap::new();
    heap.push(Reverse(Entry { priority: h(from), node: from, g: 0.0 }));

    while let Some(Reverse(Entry { node, g, .. })) = heap.pop() {
        // Skip stale heap entries.
        if g > best[node.index()] {
            continue;
        }
        if node == to {
            return Some(Found { minutes: g, prev_edge });
        }

        let now = departure.plus_minutes(g);
        for edge in network.neighbors(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_g = g + network.edge_travel_time(edge, now);

            if new_g < best[neighbor.index()] {
                best[neighbor.index()] = new_g;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse(Entry { priority: new_g + h(neighbor), node: neighbor, g: new_g }));
            }
        }
    }

    None
}
