use std::io::Write;

use anstream::print;
use anstream::println;
use clap::Parser;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use route_planner::algorithms::astar::RoutePlanner;
use route_planner::graph::Graph;
use route_planner::graphs::road_graph::RoadGraph;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{s:?} is not a number. {e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not within 0..=1"))
    }
}

fn percent(s: &str) -> Result<f32, String> {
    let p: f32 = s.parse().map_err(|e| format!("{s:?} is not a number. {e}"))?;
    if (0.0..=100.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not within 0..=100"))
    }
}

/// Finds the shortest route between two points of a road network.
///
/// Points are given as percentages of the map's width and height.
#[derive(Parser, Debug)]
#[clap(long_version = route_planner::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(env = "ROUTE_START_X", value_parser = percent)]
    pub start_x: f32,
    #[arg(env = "ROUTE_START_Y", value_parser = percent)]
    pub start_y: f32,
    #[arg(env = "ROUTE_END_X", value_parser = percent)]
    pub end_x: f32,
    #[arg(env = "ROUTE_END_Y", value_parser = percent)]
    pub end_y: f32,

    #[arg(long, env = "ROUTE_GRID_COLUMNS", default_value_t = 32usize)]
    pub columns: usize,
    #[arg(long, env = "ROUTE_GRID_ROWS", default_value_t = 32usize)]
    pub rows: usize,
    /// Real-world length of the map's side.
    #[arg(long, env = "ROUTE_METRIC_SCALE", default_value_t = 1000f32)]
    pub metric_scale: f32,

    /// Jitters nodes and drops road segments at random.
    #[arg(long, env = "ROUTE_SEED")]
    pub seed: Option<u64>,
    /// Chance of keeping each road segment of a random grid.
    #[arg(long, env = "ROUTE_ROAD_DENSITY", default_value_t = 0.8f64, value_parser = probability)]
    pub road_density: f64,

    /// Print search statistics.
    #[arg(long)]
    pub stats: bool,
    /// Print the frontier on every iteration.
    #[arg(long)]
    pub trace: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    args.color.write_global();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let graph = match args.seed {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            RoadGraph::random_grid(
                &mut rng,
                args.columns,
                args.rows,
                args.metric_scale,
                args.road_density,
            )
        }
        None => RoadGraph::grid(args.columns, args.rows, args.metric_scale),
    }
    .map_err(|e| std::io::Error::other(format!("Failed building the road graph. {e}")))?;
    println!("Built {}", graph.cyan());

    let mut planner =
        RoutePlanner::from_percent(&graph, args.start_x, args.start_y, args.end_x, args.end_y)
            .map_err(std::io::Error::other)?;
    println!(
        "Routing from {}@{} to {}@{}",
        planner.start().green(),
        graph.position(planner.start()),
        planner.end().red(),
        graph.position(planner.end()),
    );

    let result = if args.trace {
        planner.search_with_trace(|t| {
            let mut entries: Vec<_> = t.entries().collect();
            entries.sort_by_key(|e| (e.f, e.h));
            print!("{:>6} {}:", t.iteration().dimmed(), t.expanded());
            for e in entries {
                print!(" {}={}", e.node, e.f);
            }
            println!();
        })
    } else {
        planner.search()
    };

    match &result {
        Ok(route) => {
            println!("{} {}", "Found".green().bold(), route);
            println!("Distance: {}", route.distance().bold());
            for w in route.waypoints() {
                println!("  - {w} (g={}, h={})", w.g, w.h);
            }
        }
        Err(e) => println!("{} {e}", "Failed".red().bold()),
    }

    if args.stats {
        let mut out = anstream::stdout().lock();
        planner.write_stats(&mut out)?;
        out.flush()?;
    }

    result.map(|_| ()).map_err(std::io::Error::other)
}
