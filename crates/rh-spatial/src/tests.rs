//! Unit tests for rh-spatial.
//!
//! All tests use hand-crafted networks so they run without any data files.

#[cfg(test)]
mod helpers {
    use rh_core::{EdgeRecord, GeoPoint, NodeId, Timestamp};
    use crate::{RoadNetwork, RoadNetworkBuilder};

    /// Monday 2015-01-05 at `hour:min`.
    pub fn weekday_at(hour: u32, min: u32) -> Timestamp {
        Timestamp::from_ymd_hms(2015, 1, 5, hour, min, 0).unwrap()
    }

    /// Saturday 2015-01-10 at `hour:00`.
    pub fn weekend_at(hour: u32) -> Timestamp {
        Timestamp::from_ymd_hms(2015, 1, 10, hour, 0, 0).unwrap()
    }

    /// Small network, speed 60 everywhere so minutes == length.
    ///
    /// Nodes (lat, lon), source ids 100..=104:
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Undirected roads: 0-1, 1-2, 2-4 (10 each), 0-3 (50), 3-4 (10).
    /// Shortest 0→4 is 0→1→2→4 = 30 min; 0→3→4 = 60 min.
    pub fn grid_network() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(100, GeoPoint::new(0.0, 0.0)).unwrap();
        let n1 = b.add_node(101, GeoPoint::new(0.0, 1.0)).unwrap();
        let n2 = b.add_node(102, GeoPoint::new(0.0, 2.0)).unwrap();
        let n3 = b.add_node(103, GeoPoint::new(1.0, 0.0)).unwrap();
        let n4 = b.add_node(104, GeoPoint::new(1.0, 2.0)).unwrap();

        b.add_road(&EdgeRecord::constant_speed(100, 101, 10.0, 60.0)).unwrap();
        b.add_road(&EdgeRecord::constant_speed(101, 102, 10.0, 60.0)).unwrap();
        b.add_road(&EdgeRecord::constant_speed(102, 104, 10.0, 60.0)).unwrap();
        b.add_road(&EdgeRecord::constant_speed(100, 103, 50.0, 60.0)).unwrap();
        b.add_road(&EdgeRecord::constant_speed(103, 104, 10.0, 60.0)).unwrap();

        (b.build().unwrap(), [n0, n1, n2, n3, n4])
    }

    /// `side x side` lattice 0.01° apart with uniform speed 30.
    ///
    /// Edge lengths are the planar-mile distance between endpoints scaled by
    /// a varying factor >= 1, so straight-line estimates never overestimate.
    /// Source id of lattice point (i, j) is `i * side + j`.
    pub fn uniform_lattice(side: u64) -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        for i in 0..side {
            for j in 0..side {
                let pos = GeoPoint::new(40.0 + i as f64 * 0.01, -74.0 + j as f64 * 0.01);
                b.add_node(i * side + j, pos).unwrap();
            }
        }
        let stretch = |i: u64, j: u64| 1.0 + ((i * 7 + j * 3) % 5) as f64 * 0.1;
        for i in 0..side {
            for j in 0..side {
                let id = i * side + j;
                if j + 1 < side {
                    let miles = 0.01 * rh_core::LON_TO_MILES * stretch(i, j);
                    b.add_road(&EdgeRecord::constant_speed(id, id + 1, miles, 30.0)).unwrap();
                }
                if i + 1 < side {
                    let miles = 0.01 * rh_core::LAT_TO_MILES * stretch(j, i);
                    b.add_road(&EdgeRecord::constant_speed(id, id + side, miles, 30.0)).unwrap();
                }
            }
        }
        b.build().unwrap()
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rh_core::{DataError, DayKind, EdgeRecord, GeoPoint, NodeRecord};
    use crate::{RoadNetwork, RoadNetworkBuilder};

    fn two_nodes() -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node(2, GeoPoint::new(0.0, 1.0)).unwrap();
        b
    }

    #[test]
    fn empty_build_fails() {
        assert_eq!(RoadNetworkBuilder::new().build().err(), Some(DataError::NoNodes));
    }

    #[test]
    fn no_edges_fails() {
        assert_eq!(two_nodes().build().err(), Some(DataError::NoEdges));
    }

    #[test]
    fn single_road_is_two_edges() {
        let mut b = two_nodes();
        b.add_road(&EdgeRecord::constant_speed(1, 2, 1.0, 25.0)).unwrap();
        let net = b.build().unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut b = two_nodes();
        let err = b.add_node(1, GeoPoint::new(5.0, 5.0)).unwrap_err();
        assert_eq!(err, DataError::DuplicateNode(1));
        assert_eq!(b.node_count(), 2);
    }

    #[test]
    fn non_finite_coordinates_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let err = b.add_node(9, GeoPoint::new(f64::NAN, 0.0)).unwrap_err();
        assert_eq!(err, DataError::NonFiniteCoordinate(9));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let mut b = two_nodes();
        let err = b.add_directed_edge(&EdgeRecord::constant_speed(1, 7, 1.0, 25.0)).unwrap_err();
        assert_eq!(err, DataError::UnknownNode { from: 1, to: 7, missing: 7 });
    }

    #[test]
    fn negative_length_rejected() {
        let mut b = two_nodes();
        let err = b.add_directed_edge(&EdgeRecord::constant_speed(1, 2, -1.0, 25.0)).unwrap_err();
        assert!(matches!(err, DataError::InvalidLength { .. }));
    }

    #[test]
    fn zero_speed_rejected_with_hour() {
        let mut b = two_nodes();
        let mut record = EdgeRecord::constant_speed(1, 2, 1.0, 25.0);
        record.weekend_speed[17] = 0.0;
        let err = b.add_directed_edge(&record).unwrap_err();
        assert_eq!(
            err,
            DataError::InvalidSpeed { from: 1, to: 2, day: DayKind::Weekend, hour: 17, speed: 0.0 }
        );
    }

    #[test]
    fn short_speed_table_rejected() {
        let mut b = two_nodes();
        let mut record = EdgeRecord::constant_speed(1, 2, 1.0, 25.0);
        record.weekday_speed.pop();
        let err = b.add_directed_edge(&record).unwrap_err();
        assert_eq!(
            err,
            DataError::SpeedTableLength { from: 1, to: 2, day: DayKind::Weekday, len: 23 }
        );
    }

    #[test]
    fn csr_neighbors() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        assert_eq!(net.neighbors(n1).count(), 2);
        assert_eq!(net.out_degree(n0), 2);
        assert_eq!(net.out_degree(n2), 2);
        assert_eq!(net.out_degree(n3), 2);
        assert_eq!(net.out_degree(n4), 2);
        for e in net.neighbors(n0) {
            assert_eq!(net.edge_from[e.index()], n0);
        }
        assert!(net.neighbors(n0).any(|e| net.edge_to[e.index()] == n1));
    }

    #[test]
    fn directed_only_edge() {
        let mut b = two_nodes();
        b.add_directed_edge(&EdgeRecord::constant_speed(1, 2, 1.0, 25.0)).unwrap();
        let net = b.build().unwrap();
        let a = net.node_by_source_id(1).unwrap();
        let c = net.node_by_source_id(2).unwrap();
        assert_eq!(net.out_degree(a), 1);
        assert_eq!(net.out_degree(c), 0);
    }

    #[test]
    fn source_ids_round_trip() {
        let (net, nodes) = super::helpers::grid_network();
        for (offset, &node) in nodes.iter().enumerate() {
            assert_eq!(net.source_id(node), 100 + offset as u64);
            assert_eq!(net.node_by_source_id(100 + offset as u64), Some(node));
        }
        assert_eq!(net.node_by_source_id(99), None);
    }

    #[test]
    fn from_records_matches_builder() {
        let nodes = vec![
            NodeRecord { id: 5, pos: GeoPoint::new(1.0, 1.0) },
            NodeRecord { id: 3, pos: GeoPoint::new(2.0, 2.0) },
        ];
        let edges = vec![EdgeRecord::constant_speed(5, 3, 2.0, 40.0)];
        let net = RoadNetwork::from_records(&nodes, &edges).unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.node_pos(net.node_by_source_id(3).unwrap()), GeoPoint::new(2.0, 2.0));
    }

    #[test]
    fn average_speed_covers_both_tables() {
        let mut b = two_nodes();
        let mut record = EdgeRecord::constant_speed(1, 2, 1.0, 20.0);
        record.weekend_speed = vec![40.0; 24];
        b.add_directed_edge(&record).unwrap();
        b.add_directed_edge(&EdgeRecord::constant_speed(2, 1, 1.0, 30.0)).unwrap();
        let net = b.build().unwrap();
        assert!((net.average_speed() - 30.0).abs() < 1e-12);
    }
}

// ── Edge costs ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod edge_cost {
    use rh_core::{EdgeId, EdgeRecord, GeoPoint};
    use crate::RoadNetworkBuilder;
    use super::helpers::{weekday_at, weekend_at};

    #[test]
    fn hour_and_day_select_speed() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node(2, GeoPoint::new(0.0, 1.0)).unwrap();
        let mut record = EdgeRecord::constant_speed(1, 2, 10.0, 30.0);
        record.weekday_speed[8] = 60.0;
        record.weekend_speed = vec![15.0; 24];
        b.add_directed_edge(&record).unwrap();
        let net = b.build().unwrap();

        let e = EdgeId(0);
        assert!((net.edge_travel_time(e, weekday_at(7, 59)) - 20.0).abs() < 1e-12);
        assert!((net.edge_travel_time(e, weekday_at(8, 0)) - 10.0).abs() < 1e-12);
        assert!((net.edge_travel_time(e, weekday_at(8, 59)) - 10.0).abs() < 1e-12);
        assert!((net.edge_travel_time(e, weekend_at(8)) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_is_free() {
        assert_eq!(crate::travel_minutes(0.0, 25.0), 0.0);
    }
}

// ── Spatial index ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use rh_core::{DataError, EdgeRecord, GeoPoint, NodeId};
    use crate::{ExactLocator, GridIndex, NodeLocator, RoadNetwork, RoadNetworkBuilder};

    fn network_of(points: &[(f64, f64)]) -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        for (i, &(lat, lon)) in points.iter().enumerate() {
            b.add_node(i as u64, GeoPoint::new(lat, lon)).unwrap();
        }
        // Routing is irrelevant here; one self-loop satisfies the edge check.
        b.add_directed_edge(&EdgeRecord::constant_speed(0, 0, 0.0, 1.0)).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn single_node_found_for_every_partition_count() {
        let net = network_of(&[(0.0, 0.0)]);
        for partitions in 1..=900 {
            let grid = GridIndex::build(&net, partitions).unwrap();
            assert_eq!(
                grid.nearest(GeoPoint::new(0.0001, 0.0001)),
                Some(NodeId(0)),
                "partitions = {partitions}"
            );
        }
    }

    #[test]
    fn zero_partitions_rejected() {
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(GridIndex::build(&net, 0).err(), Some(DataError::ZeroPartitions));
    }

    #[test]
    fn degenerate_latitude_rejected() {
        let net = network_of(&[(5.0, 0.0), (5.0, 1.0)]);
        assert_eq!(
            GridIndex::build(&net, 900).err(),
            Some(DataError::DegenerateBounds { axis: "latitude", value: 5.0 })
        );
    }

    #[test]
    fn degenerate_longitude_rejected() {
        let net = network_of(&[(0.0, 7.0), (1.0, 7.0)]);
        assert!(matches!(
            GridIndex::build(&net, 900),
            Err(DataError::DegenerateBounds { axis: "longitude", .. })
        ));
    }

    #[test]
    fn dimension_is_ceil_sqrt() {
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(GridIndex::build(&net, 1).unwrap().dim(), 1);
        assert_eq!(GridIndex::build(&net, 10).unwrap().dim(), 4);
        assert_eq!(GridIndex::build(&net, 900).unwrap().dim(), 30);
    }

    #[test]
    fn upper_edge_and_outside_points_clamped() {
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0)]);
        let grid = GridIndex::build(&net, 100).unwrap();
        assert_eq!(grid.cell_of(GeoPoint::new(1.0, 1.0)), (9, 9));
        assert_eq!(grid.cell_of(GeoPoint::new(-3.0, 4.0)), (0, 9));
        assert_eq!(grid.cell_of(GeoPoint::new(0.55, 0.05)), (5, 0));
        assert_eq!(grid.cell(9, 9).collect::<Vec<_>>(), vec![NodeId(1)]);
        assert_eq!(grid.cell(0, 0).collect::<Vec<_>>(), vec![NodeId(0)]);
    }

    #[test]
    fn query_outside_bounds_still_resolves() {
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0)]);
        let grid = GridIndex::build(&net, 900).unwrap();
        assert_eq!(grid.nearest(GeoPoint::new(-10.0, -10.0)), Some(NodeId(0)));
        assert_eq!(grid.nearest(GeoPoint::new(10.0, 10.0)), Some(NodeId(1)));
    }

    #[test]
    fn picks_closest_candidate_in_ring() {
        // 10 x 10 grid of 0.1° cells.  Query sits in cell (0, 1); nodes 0 and
        // 2 are both inside the first ring.
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0), (0.15, 0.15)]);
        let grid = GridIndex::build(&net, 100).unwrap();
        assert_eq!(grid.nearest(GeoPoint::new(0.05, 0.12)), Some(NodeId(2)));
    }

    #[test]
    fn stops_at_first_non_empty_ring() {
        // Node 2 at lon 0.35 is two rings away from cell (0, 1) and closer
        // than node 0, but node 0 sits in the first ring.
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.35)]);
        let grid = GridIndex::build(&net, 100).unwrap();
        let query = GeoPoint::new(0.05, 0.19);
        assert_eq!(grid.nearest(query), Some(NodeId(0)));
        assert_eq!(ExactLocator::build(&net).nearest(query), Some(NodeId(2)));
    }

    #[test]
    fn widens_until_a_node_is_found() {
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0)]);
        let grid = GridIndex::build(&net, 900).unwrap();
        // Middle of an empty 30 x 30 grid: many rings before a corner.
        assert_eq!(grid.nearest(GeoPoint::new(0.6, 0.6)), Some(NodeId(1)));
        assert_eq!(grid.nearest(GeoPoint::new(0.4, 0.4)), Some(NodeId(0)));
    }

    #[test]
    fn ties_go_to_first_encountered() {
        // One cell holds everything; nodes 0 and 2 are equidistant.
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.5)]);
        let grid = GridIndex::build(&net, 1).unwrap();
        assert_eq!(grid.nearest(GeoPoint::new(0.0, 0.25)), Some(NodeId(0)));
    }

    #[test]
    fn trait_object_dispatch() {
        let (net, nodes) = super::helpers::grid_network();
        let grid = GridIndex::build(&net, 900).unwrap();
        let exact = ExactLocator::build(&net);
        let locators: [&dyn NodeLocator; 2] = [&grid, &exact];
        for locator in locators {
            assert_eq!(locator.nearest(GeoPoint::new(0.0, 0.4)), Some(nodes[0]));
            assert_eq!(locator.nearest(GeoPoint::new(0.0, 0.6)), Some(nodes[1]));
            assert_eq!(locator.nearest(GeoPoint::new(0.9, 2.1)), Some(nodes[4]));
        }
    }

    #[test]
    fn non_finite_query_finds_nothing() {
        let net = network_of(&[(0.0, 0.0), (1.0, 1.0)]);
        let grid = GridIndex::build(&net, 100).unwrap();
        let exact = ExactLocator::build(&net);
        let locators: [&dyn NodeLocator; 2] = [&grid, &exact];
        for locator in locators {
            assert_eq!(locator.nearest(GeoPoint::new(f64::NAN, 0.5)), None);
            assert_eq!(locator.nearest(GeoPoint::new(0.5, f64::INFINITY)), None);
            assert_eq!(locator.nearest(GeoPoint::new(f64::NEG_INFINITY, f64::NAN)), None);
        }
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use rh_core::{EdgeRecord, GeoPoint, NodeId};
    use crate::{AStarRouter, DijkstraRouter, RoadNetworkBuilder, Router, TravelTime};
    use super::helpers::{grid_network, uniform_lattice, weekday_at, weekend_at};

    #[test]
    fn same_node_is_zero_for_any_departure() {
        let (net, nodes) = grid_network();
        let routers: [&dyn Router; 2] = [&DijkstraRouter, &AStarRouter];
        for router in routers {
            for &n in &nodes {
                for t in [weekday_at(0, 0), weekday_at(17, 30), weekend_at(3)] {
                    assert_eq!(router.travel_time(&net, n, n, t), TravelTime::Reachable { minutes: 0.0 });
                    assert!(router.route(&net, n, n, t).unwrap().is_trivial());
                }
            }
        }
    }

    #[test]
    fn shortest_path_correct() {
        let (net, [n0, n1, n2, _, n4]) = grid_network();
        let route = DijkstraRouter.route(&net, n0, n4, weekday_at(8, 0)).unwrap();
        assert!((route.minutes - 30.0).abs() < 1e-9);
        assert_eq!(route.edges.len(), 3);
        assert_eq!(net.edge_from[route.edges[0].index()], n0);
        assert_eq!(net.edge_to[route.edges[0].index()], n1);
        assert_eq!(net.edge_to[route.edges[1].index()], n2);
        assert_eq!(net.edge_to[route.edges[2].index()], n4);
    }

    #[test]
    fn disconnected_is_unreachable_for_both() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node(2, GeoPoint::new(0.0, 0.01)).unwrap();
        b.add_node(3, GeoPoint::new(1.0, 0.0)).unwrap();
        b.add_node(4, GeoPoint::new(1.0, 0.01)).unwrap();
        b.add_road(&EdgeRecord::constant_speed(1, 2, 1.0, 30.0)).unwrap();
        b.add_road(&EdgeRecord::constant_speed(3, 4, 1.0, 30.0)).unwrap();
        let net = b.build().unwrap();

        let routers: [&dyn Router; 2] = [&DijkstraRouter, &AStarRouter];
        for router in routers {
            let t = router.travel_time(&net, NodeId(0), NodeId(3), weekday_at(9, 0));
            assert_eq!(t, TravelTime::Unreachable);
            assert_eq!(t.cost(), f64::INFINITY);
            assert!(router.route(&net, NodeId(0), NodeId(3), weekday_at(9, 0)).is_none());
            assert!(router.travel_time(&net, NodeId(0), NodeId(1), weekday_at(9, 0)).is_reachable());
        }
    }

    #[test]
    fn one_way_blocks_return() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        let c = b.add_node(2, GeoPoint::new(0.0, 1.0)).unwrap();
        b.add_directed_edge(&EdgeRecord::constant_speed(1, 2, 10.0, 30.0)).unwrap();
        let net = b.build().unwrap();

        assert_eq!(
            DijkstraRouter.travel_time(&net, a, c, weekday_at(8, 0)),
            TravelTime::Reachable { minutes: 20.0 }
        );
        assert!(!DijkstraRouter.travel_time(&net, c, a, weekday_at(8, 0)).is_reachable());
    }

    #[test]
    fn edges_costed_at_arrival_time() {
        // A→B takes 10 min always; B→C takes 10 min except during hour 9,
        // when it takes 20.
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node(2, GeoPoint::new(0.0, 0.1)).unwrap();
        let c = b.add_node(3, GeoPoint::new(0.0, 0.2)).unwrap();
        b.add_directed_edge(&EdgeRecord::constant_speed(1, 2, 10.0, 60.0)).unwrap();
        let mut slow_at_nine = EdgeRecord::constant_speed(2, 3, 10.0, 60.0);
        slow_at_nine.weekday_speed[9] = 30.0;
        b.add_directed_edge(&slow_at_nine).unwrap();
        let net = b.build().unwrap();

        let early = DijkstraRouter.travel_time(&net, a, c, weekday_at(8, 0)).minutes().unwrap();
        let late = DijkstraRouter.travel_time(&net, a, c, weekday_at(8, 50)).minutes().unwrap();
        assert!((early - 20.0).abs() < 1e-9);
        // Leaves at 08:50, reaches B at 09:00, so B→C uses the hour-9 speed.
        assert!((late - 30.0).abs() < 1e-9);
    }

    #[test]
    fn weekend_table_used_on_saturday() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(1, GeoPoint::new(0.0, 0.0)).unwrap();
        let c = b.add_node(2, GeoPoint::new(0.0, 1.0)).unwrap();
        let mut record = EdgeRecord::constant_speed(1, 2, 10.0, 60.0);
        record.weekend_speed = vec![20.0; 24];
        b.add_directed_edge(&record).unwrap();
        let net = b.build().unwrap();

        assert_eq!(DijkstraRouter.travel_time(&net, a, c, weekday_at(12, 0)).minutes(), Some(10.0));
        assert_eq!(DijkstraRouter.travel_time(&net, a, c, weekend_at(12)).minutes(), Some(30.0));
    }

    #[test]
    fn astar_matches_dijkstra_under_uniform_speed() {
        let side = 5;
        let net = uniform_lattice(side);
        let depart = weekday_at(18, 15);
        for from in 0..net.node_count() as u32 {
            for to in 0..net.node_count() as u32 {
                let d = DijkstraRouter.travel_time(&net, NodeId(from), NodeId(to), depart);
                let a = AStarRouter.travel_time(&net, NodeId(from), NodeId(to), depart);
                let (d, a) = (d.minutes().unwrap(), a.minutes().unwrap());
                assert!((d - a).abs() < 1e-9, "{from} -> {to}: dijkstra {d}, astar {a}");
            }
        }
    }

    #[test]
    fn astar_route_is_connected() {
        let net = uniform_lattice(4);
        let (from, to) = (NodeId(0), NodeId(15));
        let route = AStarRouter.route(&net, from, to, weekday_at(7, 0)).unwrap();
        assert_eq!(net.edge_from[route.edges[0].index()], from);
        assert_eq!(net.edge_to[route.edges.last().unwrap().index()], to);
        for pair in route.edges.windows(2) {
            assert_eq!(net.edge_to[pair[0].index()], net.edge_from[pair[1].index()]);
        }
    }
}
