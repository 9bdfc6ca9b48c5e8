//! The road network as seen by the search.
//!
//! Graphs own their nodes. The search refers to them through [`NodeId`]s and
//! only ever reads the graph.
use derive_more::Display;
use nonmax::NonMaxU32;
use smallvec::SmallVec;

use crate::cost::Cost;

/// Neighbour lists small enough for a street crossing stay on the stack.
pub const NEIGHBOURS_INLINE: usize = 8;
pub type Neighbours = SmallVec<[NodeId; NEIGHBOURS_INLINE]>;

/// A stable reference to a node owned by a [`Graph`].
///
/// `Option<NodeId>` is as wide as a `NodeId`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
#[display("Node({})", _0.get())]
pub struct NodeId(NonMaxU32);

impl NodeId {
    pub fn new(index: usize) -> Option<NodeId> {
        let index = u32::try_from(index).ok()?;
        Some(NodeId(NonMaxU32::new(index)?))
    }

    /// The position of this node in its graph's node arena.
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0.get() as usize
    }
}

/// A planar position as fractions of the map's bounding box.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq)]
#[display("({x},{y})")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    /// Converts a `0..=100` percentage pair into fractions.
    pub fn from_percent(x: f32, y: f32) -> Point {
        Point::new(x * 0.01, y * 0.01)
    }

    #[inline(always)]
    pub fn squared_distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline(always)]
    pub fn distance(&self, other: &Point) -> f32 {
        self.squared_distance(other).sqrt()
    }
}

/// The primitives A* needs from a road network.
///
/// `distance` must be symmetric, non-negative and satisfy the triangle
/// inequality. It doubles as edge cost and heuristic, which keeps the
/// heuristic consistent.
pub trait Graph<C>: std::fmt::Debug
where
    C: Cost,
{
    /// The node nearest to a point. Only `None` on empty graphs.
    fn closest_node(&self, p: Point) -> Option<NodeId>;

    /// Nodes adjacent to `n`. The order only matters for tie-breaking.
    fn neighbours(&self, n: NodeId) -> Neighbours;

    fn distance(&self, a: NodeId, b: NodeId) -> C;

    /// Converts graph units into real-world units.
    fn metric_scale(&self) -> C;

    fn position(&self, n: NodeId) -> Point;

    /// Number of nodes, if known.
    fn size(&self) -> Option<usize> {
        None
    }
}
