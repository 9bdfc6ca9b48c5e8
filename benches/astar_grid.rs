use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use route_planner::algorithms::astar::RoutePlanner;
use route_planner::graphs::road_graph::RoadGraph;

const SIDES: [usize; 3] = [32, 128, 512];
const NUM_RANDOM_INSTANCES: u64 = 3;
const ROAD_DENSITY: f64 = 0.8;

/// Routes between opposite corners.
fn corner_to_corner(graph: &RoadGraph) -> bool {
    match RoutePlanner::from_percent(graph, 0.0, 0.0, 100.0, 100.0) {
        Ok(mut planner) => planner.search().is_ok(),
        Err(_) => false,
    }
}

fn grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid Search");

    for side in SIDES {
        let graph = RoadGraph::grid(side, side, 1000.0).unwrap();
        group.bench_with_input(BenchmarkId::new("A*", format!("{side}x{side}")), &graph, |b, g| {
            b.iter(|| corner_to_corner(g))
        });
    }
    group.finish();
}

fn random_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Random Grid Search");

    for side in SIDES {
        for i in 0..NUM_RANDOM_INSTANCES {
            let mut rng = ChaCha8Rng::seed_from_u64(i);
            let graph = RoadGraph::random_grid(&mut rng, side, side, 1000.0, ROAD_DENSITY).unwrap();
            if !corner_to_corner(&graph) {
                log::warn!("Skipping {side}x{side}:{i} as the corners are disconnected");
                continue;
            }

            let instance_name = format!("{side}x{side}:{i}");
            group.bench_with_input(BenchmarkId::new("A*", &instance_name), &graph, |b, g| {
                b.iter(|| corner_to_corner(g))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, grid_search, random_grid_search);
criterion_main!(benches);
