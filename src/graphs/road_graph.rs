//! A road network held in memory.
//!
//! Nodes live in an arena indexed by [`NodeId`] and roads are sequences of
//! nodes where every consecutive pair is a two-way segment.
use derive_more::Display;
use thiserror::Error;
use thousands::Separable;

use crate::float_cost::FloatCost;
use crate::graph::Graph;
use crate::graph::Neighbours;
use crate::graph::NodeId;
use crate::graph::Point;

pub type RoadCost = FloatCost<f32>;

/// Share of a grid step a node may be moved away from its grid position.
const MAX_JITTER: f32 = 0.25;

#[derive(Debug, Error, PartialEq)]
pub enum RoadGraphError {
    #[error("The graph can't hold more than {max} nodes")]
    TooManyNodes { max: u32 },
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    #[error("Roads need at least 2 nodes, got {0}")]
    ShortRoad(usize),
    #[error("Invalid metric scale {0}")]
    InvalidMetricScale(f32),
    #[error("Road density {0} is not within 0..=1")]
    InvalidDensity(f64),
    #[error("A {columns}x{rows} grid has too many nodes")]
    GridTooLarge { columns: usize, rows: usize },
}

#[derive(Clone, Display)]
#[display(
    "RoadGraph({} nodes; {} roads; {} segments)",
    points.len().separate_with_commas(),
    num_roads.separate_with_commas(),
    num_segments.separate_with_commas()
)]
pub struct RoadGraph {
    points: Vec<Point>,
    adjacency: Vec<Neighbours>,

    metric_scale: f32,

    // Stats
    num_roads: usize,
    num_segments: usize,
}

impl RoadGraph {
    pub fn new(metric_scale: f32) -> Result<RoadGraph, RoadGraphError> {
        if !(metric_scale.is_finite() && metric_scale > 0.0) {
            return Err(RoadGraphError::InvalidMetricScale(metric_scale));
        }

        Ok(RoadGraph {
            points: vec![],
            adjacency: vec![],
            metric_scale,
            num_roads: 0,
            num_segments: 0,
        })
    }

    pub fn add_node(&mut self, p: Point) -> Result<NodeId, RoadGraphError> {
        let id = NodeId::new(self.points.len()).ok_or(RoadGraphError::TooManyNodes {
            max: u32::MAX - 1,
        })?;
        self.points.push(p);
        self.adjacency.push(Neighbours::new());
        Ok(id)
    }

    /// Adds a road going through `nodes` in order.
    ///
    /// Segments that already exist are not duplicated.
    pub fn add_road(&mut self, nodes: &[NodeId]) -> Result<(), RoadGraphError> {
        if nodes.len() < 2 {
            return Err(RoadGraphError::ShortRoad(nodes.len()));
        }
        if let Some(&unknown) = nodes.iter().find(|n| n.index() >= self.points.len()) {
            return Err(RoadGraphError::UnknownNode(unknown));
        }

        for pair in nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b || self.adjacency[a.index()].contains(&b) {
                continue;
            }
            self.adjacency[a.index()].push(b);
            self.adjacency[b.index()].push(a);
            self.num_segments += 1;
        }
        self.num_roads += 1;

        Ok(())
    }

    /// A `columns`x`rows` grid spanning the whole map.
    ///
    /// Every row and every column is a road. Nodes are laid out row by row, so
    /// `(c, r)` is `NodeId(r * columns + c)`.
    pub fn grid(
        columns: usize,
        rows: usize,
        metric_scale: f32,
    ) -> Result<RoadGraph, RoadGraphError> {
        let mut graph = RoadGraph::new(metric_scale)?;
        let ids = graph.add_grid_nodes(columns, rows, |_, _| (0.0, 0.0))?;

        for r in 0..rows {
            if columns > 1 {
                graph.add_road(&ids[r * columns..(r + 1) * columns])?;
            }
        }
        for c in 0..columns {
            if rows > 1 {
                let column: Vec<NodeId> = (0..rows).map(|r| ids[r * columns + c]).collect();
                graph.add_road(&column)?;
            }
        }

        Ok(graph)
    }

    /// A grid with jittered nodes where each segment survives with
    /// probability `density`.
    ///
    /// Every kept segment is its own road, so the network is often
    /// disconnected at low densities.
    pub fn random_grid<R: rand::Rng>(
        r: &mut R,
        columns: usize,
        rows: usize,
        metric_scale: f32,
        density: f64,
    ) -> Result<RoadGraph, RoadGraphError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(RoadGraphError::InvalidDensity(density));
        }
        let mut graph = RoadGraph::new(metric_scale)?;
        let ids = graph.add_grid_nodes(columns, rows, |step_x, step_y| {
            (
                r.random_range(-MAX_JITTER..=MAX_JITTER) * step_x,
                r.random_range(-MAX_JITTER..=MAX_JITTER) * step_y,
            )
        })?;

        for row in 0..rows {
            for c in 0..columns {
                let id = ids[row * columns + c];
                if c + 1 < columns && r.random_bool(density) {
                    graph.add_road(&[id, ids[row * columns + c + 1]])?;
                }
                if row + 1 < rows && r.random_bool(density) {
                    graph.add_road(&[id, ids[(row + 1) * columns + c]])?;
                }
            }
        }

        Ok(graph)
    }

    fn add_grid_nodes<J>(
        &mut self,
        columns: usize,
        rows: usize,
        mut jitter: J,
    ) -> Result<Vec<NodeId>, RoadGraphError>
    where
        J: FnMut(f32, f32) -> (f32, f32),
    {
        let len = columns
            .checked_mul(rows)
            .filter(|&n| n < u32::MAX as usize)
            .ok_or(RoadGraphError::GridTooLarge { columns, rows })?;

        let step = |n: usize| if n > 1 { 1.0 / (n - 1) as f32 } else { 0.0 };
        let (step_x, step_y) = (step(columns), step(rows));

        let mut ids = Vec::with_capacity(len);
        for r in 0..rows {
            for c in 0..columns {
                let (dx, dy) = jitter(step_x, step_y);
                let x = (c as f32 * step_x + dx).clamp(0.0, 1.0);
                let y = (r as f32 * step_y + dy).clamp(0.0, 1.0);
                ids.push(self.add_node(Point::new(x, y))?);
            }
        }
        Ok(ids)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn num_roads(&self) -> usize {
        self.num_roads
    }
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }
}

impl Graph<RoadCost> for RoadGraph {
    /// Linear scan, ties go to the lowest id.
    fn closest_node(&self, p: Point) -> Option<NodeId> {
        let mut best: Option<(usize, f32)> = None;
        for (i, q) in self.points.iter().enumerate() {
            let d = p.squared_distance(q);
            match best {
                Some((_, best_d)) if best_d <= d => {}
                _ => best = Some((i, d)),
            }
        }
        NodeId::new(best?.0)
    }

    #[inline(always)]
    fn neighbours(&self, n: NodeId) -> Neighbours {
        self.adjacency[n.index()].clone()
    }

    #[inline(always)]
    fn distance(&self, a: NodeId, b: NodeId) -> RoadCost {
        RoadCost::new(self.points[a.index()].distance(&self.points[b.index()]))
    }

    fn metric_scale(&self) -> RoadCost {
        RoadCost::new(self.metric_scale)
    }

    #[inline(always)]
    fn position(&self, n: NodeId) -> Point {
        self.points[n.index()]
    }

    fn size(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl std::fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "RoadGraph({}; {}; {}; x{})",
            self.points.len().separate_with_commas(),
            self.num_roads.separate_with_commas(),
            self.num_segments.separate_with_commas(),
            self.metric_scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn id(i: usize) -> NodeId {
        NodeId::new(i).unwrap()
    }

    #[test]
    fn grid_layout() {
        let g = RoadGraph::grid(3, 2, 1.0).unwrap();
        assert_eq!(g.len(), 6);
        // 2 rows + 3 columns
        assert_eq!(g.num_roads(), 5);
        assert_eq!(g.num_segments(), 7);

        assert_eq!(g.position(id(0)), Point::new(0.0, 0.0));
        assert_eq!(g.position(id(2)), Point::new(1.0, 0.0));
        assert_eq!(g.position(id(4)), Point::new(0.5, 1.0));

        let mut n = g.neighbours(id(1)).to_vec();
        n.sort();
        assert_eq!(n, vec![id(0), id(2), id(4)]);
    }

    #[test]
    fn closest_node() {
        let g = RoadGraph::grid(3, 3, 1.0).unwrap();
        assert_eq!(g.closest_node(Point::new(0.1, 0.1)), Some(id(0)));
        assert_eq!(g.closest_node(Point::new(0.9, 0.6)), Some(id(5)));
        assert_eq!(g.closest_node(Point::new(7.0, 7.0)), Some(id(8)));
        // Equidistant to 0 and 1
        assert_eq!(g.closest_node(Point::new(0.25, 0.0)), Some(id(0)));

        let empty = RoadGraph::new(1.0).unwrap();
        assert_eq!(empty.closest_node(Point::new(0.5, 0.5)), None);
    }

    #[test]
    fn roads() {
        let mut g = RoadGraph::new(10.0).unwrap();
        let a = g.add_node(Point::new(0.0, 0.0)).unwrap();
        let b = g.add_node(Point::new(0.0, 0.5)).unwrap();

        assert_eq!(g.add_road(&[a]), Err(RoadGraphError::ShortRoad(1)));
        assert_eq!(g.add_road(&[a, id(7)]), Err(RoadGraphError::UnknownNode(id(7))));

        g.add_road(&[a, b]).unwrap();
        g.add_road(&[b, a, a]).unwrap();
        assert_eq!(g.num_roads(), 2);
        assert_eq!(g.num_segments(), 1);
        assert_eq!(g.neighbours(a).to_vec(), vec![b]);

        assert_eq!(g.distance(a, b), RoadCost::new(0.5));
        assert_eq!(g.distance(b, a), g.distance(a, b));
        assert_eq!(g.metric_scale(), RoadCost::new(10.0));
    }

    #[test]
    fn invalid_scale() {
        assert!(RoadGraph::new(0.0).is_err());
        assert!(RoadGraph::new(f32::NAN).is_err());
        assert!(RoadGraph::grid(2, 2, -1.0).is_err());
    }

    #[test]
    fn random_grids_are_reproducible() {
        let a = RoadGraph::random_grid(&mut ChaCha8Rng::seed_from_u64(7), 8, 8, 1.0, 0.7).unwrap();
        let b = RoadGraph::random_grid(&mut ChaCha8Rng::seed_from_u64(7), 8, 8, 1.0, 0.7).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a.points, b.points);
        assert_eq!(a.num_segments(), b.num_segments());
        assert!(a.num_segments() <= 2 * 8 * 7);
        for p in &a.points {
            assert!((0.0..=1.0).contains(&p.x));
            assert!((0.0..=1.0).contains(&p.y));
        }

        let sparse = RoadGraph::random_grid(&mut ChaCha8Rng::seed_from_u64(7), 4, 4, 1.0, 0.0).unwrap();
        assert_eq!(sparse.num_segments(), 0);
    }

    #[test]
    fn invalid_density() {
        let mut r = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            RoadGraph::random_grid(&mut r, 3, 3, 1.0, f64::NAN),
            Err(RoadGraphError::InvalidDensity(d)) if d.is_nan()
        ));
        assert_eq!(
            RoadGraph::random_grid(&mut r, 3, 3, 1.0, 1.5).unwrap_err(),
            RoadGraphError::InvalidDensity(1.5)
        );
        assert_eq!(
            RoadGraph::random_grid(&mut r, 3, 3, 1.0, -0.1).unwrap_err(),
            RoadGraphError::InvalidDensity(-0.1)
        );
        assert_eq!(RoadGraph::random_grid(&mut r, 3, 3, 1.0, 1.0).unwrap().num_segments(), 12);
    }

    #[test]
    fn oversized_grids() {
        assert_eq!(
            RoadGraph::grid(usize::MAX, 2, 1.0).unwrap_err(),
            RoadGraphError::GridTooLarge {
                columns: usize::MAX,
                rows: 2
            }
        );
        assert_eq!(
            RoadGraph::grid(1 << 20, 1 << 20, 1.0).unwrap_err(),
            RoadGraphError::GridTooLarge {
                columns: 1 << 20,
                rows: 1 << 20
            }
        );
        let mut r = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            RoadGraph::random_grid(&mut r, 2, usize::MAX, 1.0, 0.5),
            Err(RoadGraphError::GridTooLarge { .. })
        ));
    }
}
