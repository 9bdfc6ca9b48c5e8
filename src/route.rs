use derive_more::Display;

use crate::cost::Cost;
use crate::graph::NodeId;
use crate::graph::Point;

const MAX_WAYPOINTS_DISPLAYED: usize = 20;

/// A snapshot of a node on a route, as the search left it.
#[derive(Copy, Clone, Debug, Display, PartialEq)]
#[display("{id}@{point}")]
pub struct Waypoint<C: Cost> {
    pub id: NodeId,
    pub point: Point,
    /// Distance from the start, in graph units.
    pub g: C,
    /// Straight-line estimate to the end, in graph units.
    pub h: C,
}

/// The route found by a search, start first.
#[derive(Clone, Debug, PartialEq)]
pub struct Route<C: Cost> {
    waypoints: Vec<Waypoint<C>>,
    /// Real-world length.
    distance: C,
}

impl<C> Route<C>
where
    C: Cost,
{
    pub(crate) fn new(waypoints: Vec<Waypoint<C>>, distance: C) -> Self {
        debug_assert!(!waypoints.is_empty());
        Self {
            waypoints,
            distance,
        }
    }

    /// Total length, already scaled to real-world units.
    #[inline(always)]
    pub fn distance(&self) -> C {
        self.distance
    }

    #[inline(always)]
    pub fn waypoints(&self) -> &[Waypoint<C>] {
        &self.waypoints
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.waypoints.iter().map(|w| w.id)
    }

    pub fn start(&self) -> &Waypoint<C> {
        &self.waypoints[0]
    }

    pub fn end(&self) -> &Waypoint<C> {
        &self.waypoints[self.waypoints.len() - 1]
    }

    /// Number of waypoints, both ends included.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

impl<C> std::fmt::Display for Route<C>
where
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Route({}, {}:[", self.distance, self.start())?;
        for (i, w) in self
            .waypoints
            .iter()
            .skip(1)
            .take(MAX_WAYPOINTS_DISPLAYED)
            .enumerate()
        {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", w.id)?;
        }
        if self.waypoints.len() > MAX_WAYPOINTS_DISPLAYED + 1 {
            write!(f, " ...")?;
        }
        write!(f, "]:{})", self.end())
    }
}
