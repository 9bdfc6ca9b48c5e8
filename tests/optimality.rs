use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use route_planner::algorithms::astar::RoutePlanner;
use route_planner::error::RouteError;
use route_planner::graph::Graph;
use route_planner::graph::NodeId;
use route_planner::graph::Point;
use route_planner::graphs::road_graph::RoadCost;
use route_planner::graphs::road_graph::RoadGraph;

const NUM_INSTANCES: u64 = 40;

/// Plain Dijkstra over the whole graph, in graph units.
fn shortest_distances(graph: &RoadGraph, start: NodeId) -> Vec<Option<RoadCost>> {
    let mut best: Vec<Option<RoadCost>> = vec![None; graph.len()];
    let mut open = BinaryHeap::new();
    best[start.index()] = Some(RoadCost::new(0.0));
    open.push(Reverse((RoadCost::new(0.0), start)));

    while let Some(Reverse((g, n))) = open.pop() {
        if best[n.index()].is_some_and(|b| b < g) {
            continue;
        }
        for m in graph.neighbours(n) {
            let new_g = g + graph.distance(n, m);
            if best[m.index()].is_none_or(|b| new_g < b) {
                best[m.index()] = Some(new_g);
                open.push(Reverse((new_g, m)));
            }
        }
    }
    best
}

fn random_point<R: Rng>(r: &mut R) -> Point {
    Point::from_percent(r.random_range(0.0..=100.0), r.random_range(0.0..=100.0))
}

#[test]
fn routes_are_shortest_on_random_grids() {
    let mut found = 0;
    for seed in 0..NUM_INSTANCES {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = RoadGraph::random_grid(&mut rng, 16, 12, 1.0, 0.7).unwrap();
        let start = random_point(&mut rng);
        let end = random_point(&mut rng);

        let mut planner = RoutePlanner::new(&graph, start, end).unwrap();
        assert_eq!(Some(planner.start()), graph.closest_node(start));
        assert_eq!(Some(planner.end()), graph.closest_node(end));

        let expected = shortest_distances(&graph, planner.start())[planner.end().index()];
        match (planner.search(), expected) {
            (Ok(route), Some(expected)) => {
                found += 1;
                approx::assert_relative_eq!(
                    route.distance().value(),
                    expected.value(),
                    epsilon = 1e-5,
                    max_relative = 1e-4
                );
                assert_eq!(route.start().id, planner.start());
                assert_eq!(route.end().id, planner.end());
            }
            (Err(e), None) => {
                assert_eq!(
                    e,
                    RouteError::NoPathFound {
                        start: planner.start(),
                        end: planner.end()
                    }
                );
            }
            (got, expected) => panic!("Seed {seed}: got {got:?}, expected {expected:?}"),
        }
    }
    // Dense enough that most instances are connected.
    assert!(found > 0);
}

#[test]
fn routes_follow_roads() {
    for seed in 0..NUM_INSTANCES {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = RoadGraph::random_grid(&mut rng, 10, 10, 250.0, 0.9).unwrap();
        let start = random_point(&mut rng);
        let end = random_point(&mut rng);

        let mut planner = RoutePlanner::new(&graph, start, end).unwrap();
        let Ok(route) = planner.search() else {
            continue;
        };

        let mut length = RoadCost::new(0.0);
        for w in route.waypoints().windows(2) {
            assert!(graph.neighbours(w[0].id).contains(&w[1].id));
            assert!(w[0].g < w[1].g);
            length += graph.distance(w[0].id, w[1].id);
        }
        // Nodes never repeat.
        let mut nodes: Vec<NodeId> = route.nodes().collect();
        nodes.sort();
        nodes.dedup();
        assert_eq!(nodes.len(), route.len());

        approx::assert_relative_eq!(
            route.distance().value(),
            length.value() * 250.0,
            max_relative = 1e-4
        );
        approx::assert_relative_eq!(
            route.end().g.value(),
            length.value(),
            epsilon = 1e-5,
            max_relative = 1e-4
        );
        assert_eq!(route.start().g, RoadCost::new(0.0));
        assert_eq!(route.end().h, RoadCost::new(0.0));
    }
}
