use crate::cost::Cost;
use crate::graph::Graph;
use crate::graph::NodeId;
use crate::route::Route;
use crate::route::Waypoint;

/// The bit used to track `is_closed: bool` within indices.
///
/// Arena slots are shifted left by one to make room for it, so the node map
/// can answer "seen?" and "expanded?" with a single lookup.
const IS_CLOSED_BIT: usize = 1usize;

/// A reference to a `SearchTreeNode<C>` in its `SearchTree<C>`.
///
/// It's more like a `(usize, bool)` underneath to help track whether the node
/// is closed. Equality ignores the closed bit.
#[derive(Copy, Clone, Debug)]
pub struct SearchTreeIndex {
    index: usize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(slot: usize) -> Self {
        debug_assert!(slot <= usize::MAX >> 1);
        Self { index: slot << 1 }
    }

    #[inline(always)]
    pub(crate) fn slot(&self) -> usize {
        self.index >> 1
    }

    pub fn is_closed(&self) -> bool {
        self.index & IS_CLOSED_BIT == IS_CLOSED_BIT
    }
    pub fn set_closed(&mut self) {
        debug_assert!(!self.is_closed());
        self.index |= IS_CLOSED_BIT;
    }
}

impl PartialEq for SearchTreeIndex {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.slot() == other.slot()
    }
}
impl Eq for SearchTreeIndex {}

/// Search state for one graph node.
///
/// The graph owns the node itself; this holds what a single search learnt
/// about it.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct SearchTreeNode<C>
where
    C: Cost,
{
    pub(crate) parent: Option<SearchTreeIndex>,
    pub(crate) node: NodeId,
    pub(crate) g: C,
    pub(crate) h: C,
    /// Position in the frontier while the node is open.
    pub(crate) heap_index: usize,
}

impl<C> SearchTreeNode<C>
where
    C: Cost,
{
    pub fn new(node: NodeId, parent: Option<SearchTreeIndex>, g: C, h: C) -> Self {
        Self {
            parent,
            node,
            g,
            h,
            heap_index: 0usize,
        }
    }

    /// Gives this Node a better path through a new parent.
    pub fn reach(&mut self, new_parent: SearchTreeIndex, g: C) {
        debug_assert!(g < self.g);
        self.parent = Some(new_parent);
        self.g = g;
    }

    #[inline(always)]
    pub fn node(&self) -> NodeId {
        self.node
    }
    /// Accumulated distance from the start.
    #[inline(always)]
    pub fn g(&self) -> C {
        self.g
    }
    /// Estimated distance to the end.
    #[inline(always)]
    pub fn h(&self) -> C {
        self.h
    }
    #[inline(always)]
    pub fn f(&self) -> C {
        self.g.saturating_add(&self.h)
    }
}

/// Arena of every node reached by a search.
///
/// Only grows during a search. Nodes point to their parents with indices,
/// which naturally forms a tree rooted at the start.
#[derive(Default)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct SearchTree<C>
where
    C: Cost,
{
    nodes: Vec<SearchTreeNode<C>>,
}

impl<C> SearchTree<C>
where
    C: Cost,
{
    #[must_use]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, node: SearchTreeNode<C>) -> SearchTreeIndex {
        let index = SearchTreeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn waypoint<G: Graph<C>>(&self, graph: &G, i: SearchTreeIndex) -> Waypoint<C> {
        let n = &self[i];
        Waypoint {
            id: n.node,
            point: graph.position(n.node),
            g: n.g,
            h: n.h,
        }
    }

    /// Rebuilds the route to `node_index` by following parents up to the root.
    ///
    /// Step distances are summed in graph units and scaled once at the end.
    #[must_use]
    pub fn path<G: Graph<C>>(&self, graph: &G, mut node_index: SearchTreeIndex) -> Route<C> {
        let mut waypoints = vec![self.waypoint(graph, node_index)];
        let mut distance = C::zero();

        while let Some(parent_index) = self[node_index].parent {
            debug_assert!(node_index != parent_index);
            debug_assert!(waypoints.len() <= self.len(), "Parent cycle");

            distance += graph.distance(self[node_index].node, self[parent_index].node);
            waypoints.push(self.waypoint(graph, parent_index));
            node_index = parent_index;
        }

        waypoints.reverse();
        Route::new(waypoints, distance * graph.metric_scale())
    }
}

impl<C> std::ops::Index<SearchTreeIndex> for SearchTree<C>
where
    C: Cost,
{
    type Output = SearchTreeNode<C>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.slot()]
    }
}

impl<C> std::ops::IndexMut<SearchTreeIndex> for SearchTree<C>
where
    C: Cost,
{
    #[inline(always)]
    fn index_mut(&mut self, index: SearchTreeIndex) -> &mut SearchTreeNode<C> {
        &mut self.nodes[index.slot()]
    }
}

impl<C> std::fmt::Debug for SearchTree<C>
where
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::Point;
    use crate::graphs::road_graph::RoadCost;
    use crate::graphs::road_graph::RoadGraph;

    #[test]
    fn closed_bit() {
        let mut i = SearchTreeIndex::new(5);
        assert!(!i.is_closed());
        i.set_closed();
        assert!(i.is_closed());
        assert_eq!(i.slot(), 5);
        assert_eq!(i, SearchTreeIndex::new(5));
    }

    #[test]
    fn path_follows_parents() {
        let mut g = RoadGraph::new(3.0).unwrap();
        let a = g.add_node(Point::new(0.0, 0.0)).unwrap();
        let b = g.add_node(Point::new(0.0, 0.5)).unwrap();
        let c = g.add_node(Point::new(0.5, 0.5)).unwrap();
        g.add_road(&[a, b, c]).unwrap();

        let mut tree = SearchTree::<RoadCost>::default();
        let zero = RoadCost::new(0.0);
        let ia = tree.push(SearchTreeNode::new(a, None, zero, zero));
        let ic = tree.push(SearchTreeNode::new(c, Some(ia), RoadCost::new(0.9), zero));
        let ib = tree.push(SearchTreeNode::new(b, Some(ia), RoadCost::new(0.5), zero));
        // A better way into `c`
        tree[ic].reach(ib, RoadCost::new(0.8));

        let route = tree.path(&g, ic);
        assert_eq!(route.nodes().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(route.start().id, a);
        assert_eq!(route.end().id, c);
        assert_eq!(route.end().g, RoadCost::new(0.8));
        approx::assert_relative_eq!(route.distance().value(), 3.0);

        let root = tree.path(&g, ia);
        assert_eq!(root.len(), 1);
        assert_eq!(root.distance(), zero);
    }
}
