//! A* route search between two points of a road network.
use log::Level;
use log::debug;
use log::log_enabled;
use log::trace;
use log::warn;
use rustc_hash::FxHashMap;

use crate::cost::Cost;
use crate::error::RouteError;
use crate::frontier::Frontier;
use crate::graph::Graph;
use crate::graph::NodeId;
use crate::graph::Point;
use crate::route::Route;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;

const INITIAL_CAPACITY: usize = 2048;

/// A read-only view of an open node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrontierEntry<C: Cost> {
    pub node: NodeId,
    pub g: C,
    pub h: C,
    pub f: C,
}

/// What a trace hook gets to see after each expansion, right before the next
/// node is selected.
pub struct FrontierTrace<'a, C>
where
    C: Cost,
{
    iteration: usize,
    expanded: NodeId,
    frontier: &'a Frontier<C>,
    search_tree: &'a SearchTree<C>,
}

impl<'a, C> FrontierTrace<'a, C>
where
    C: Cost,
{
    /// Zero-based iteration number.
    pub fn iteration(&self) -> usize {
        self.iteration
    }
    /// The node that was just expanded.
    pub fn expanded(&self) -> NodeId {
        self.expanded
    }
    pub fn len(&self) -> usize {
        self.frontier.len()
    }
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// The node that will be selected next, if any.
    pub fn best(&self) -> Option<FrontierEntry<C>> {
        self.frontier.peek().map(|e| self.entry(e.node_index))
    }

    /// Every open node, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = FrontierEntry<C>> + '_ {
        self.frontier.iter().map(|e| self.entry(e.node_index))
    }

    fn entry(&self, i: SearchTreeIndex) -> FrontierEntry<C> {
        let n = &self.search_tree[i];
        FrontierEntry {
            node: n.node(),
            g: n.g(),
            h: n.h(),
            f: n.f(),
        }
    }
}

/// A* search from one node to another.
///
/// The graph is only borrowed. All the per-node search state (`g`, `h`,
/// parent and whether the node was expanded) lives in the planner, so a graph
/// can serve any number of searches.
pub struct RoutePlanner<'g, G, C>
where
    G: Graph<C>,
    C: Cost,
{
    graph: &'g G,
    start: NodeId,
    end: NodeId,

    /// All the Search Nodes. Naturally forms a Search Tree as each node but
    /// the start has a parent Node.
    search_tree: SearchTree<C>,

    /// An intrusive heap of `(AStarRank, SearchTreeIndex)` that keeps the
    /// referenced node updated (`SearchTreeNode::heap_index`).
    open: Frontier<C>,

    /// Amalgamation of,
    /// - The `HashMap<NodeId, &mut SearchTreeNode>`, but using `SearchTreeIndex`
    ///   - To find existing Search Nodes from their `NodeId`.
    /// - The "Closed Set" `HashSet<NodeId>`
    ///   - To recall whether we had already expanded a node.
    node_map: FxHashMap<NodeId, SearchTreeIndex>,

    iterations: usize,
}

impl<'g, G, C> RoutePlanner<'g, G, C>
where
    G: Graph<C>,
    C: Cost,
{
    /// Plans between the nodes closest to `start` and `end`.
    pub fn new(graph: &'g G, start: Point, end: Point) -> Result<Self, RouteError> {
        let start_node = graph.closest_node(start).ok_or(RouteError::EmptyGraph)?;
        let end_node = graph.closest_node(end).ok_or(RouteError::EmptyGraph)?;
        debug!("Resolved {start} to {start_node} and {end} to {end_node}");

        // Small graphs don't need the whole initial capacity.
        let capacity = graph
            .size()
            .map_or(INITIAL_CAPACITY, |n| n.min(INITIAL_CAPACITY));
        Ok(Self {
            graph,
            start: start_node,
            end: end_node,
            search_tree: SearchTree::with_capacity(capacity),
            open: Frontier::with_capacity(capacity),
            node_map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            iterations: 0,
        })
    }

    /// Like [`RoutePlanner::new`], with coordinates as `0..=100` percentages
    /// of the map.
    pub fn from_percent(
        graph: &'g G,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
    ) -> Result<Self, RouteError> {
        Self::new(
            graph,
            Point::from_percent(start_x, start_y),
            Point::from_percent(end_x, end_y),
        )
    }

    pub fn start(&self) -> NodeId {
        self.start
    }
    pub fn end(&self) -> NodeId {
        self.end
    }
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The heuristic: straight-line distance to the end node.
    #[inline(always)]
    #[must_use]
    pub fn h(&self, node: NodeId) -> C {
        self.graph.distance(node, self.end)
    }

    /// Finds a shortest route, logging the frontier on every iteration at
    /// `trace` level.
    pub fn search(&mut self) -> Result<Route<C>, RouteError> {
        self.search_with_trace(|t| {
            if log_enabled!(Level::Trace) {
                let mut fs: Vec<C> = t.entries().map(|e| e.f).collect();
                fs.sort_unstable();
                let fs: Vec<String> = fs.iter().map(|f| f.to_string()).collect();
                trace!(
                    "Iteration {}: expanded {}, open f-values [{}]",
                    t.iteration(),
                    t.expanded(),
                    fs.join(" ")
                );
            }
        })
    }

    /// Finds a shortest route, calling `hook` once per iteration.
    ///
    /// Every call starts over, so searching twice yields the same route.
    pub fn search_with_trace<F>(&mut self, mut hook: F) -> Result<Route<C>, RouteError>
    where
        F: FnMut(&FrontierTrace<'_, C>),
    {
        self.reset();
        debug!("Searching a route from {} to {}", self.start, self.end);

        let h = self.h(self.start);
        let mut current = self.add_node(self.start, None, C::zero(), h);
        self.mark_closed(self.start);

        while self.search_tree[current].node != self.end {
            self.expand(current);
            hook(&FrontierTrace {
                iteration: self.iterations,
                expanded: self.search_tree[current].node,
                frontier: &self.open,
                search_tree: &self.search_tree,
            });

            current = match self.select_next() {
                Some(next) => next,
                None => {
                    warn!(
                        "No route from {} to {} after {} iterations",
                        self.start, self.end, self.iterations
                    );
                    return Err(RouteError::NoPathFound {
                        start: self.start,
                        end: self.end,
                    });
                }
            };
            self.iterations += 1;
        }

        let route = self.search_tree.path(self.graph, current);
        if !route.distance().valid() {
            warn!("{route} is longer than the metric scale can represent");
        }
        debug!(
            "Found {route} after {} iterations ({} nodes reached)",
            self.iterations,
            self.search_tree.len()
        );
        Ok(route)
    }

    /// Search state of a node reached by the last search.
    pub fn node(&self, node: NodeId) -> Option<&SearchTreeNode<C>> {
        self.node_map.get(&node).map(|&i| &self.search_tree[i])
    }

    /// Whether the last search expanded `node`.
    pub fn is_closed(&self, node: NodeId) -> bool {
        match self.node_map.get(&node) {
            Some(node_index) => node_index.is_closed(),
            None => false,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn frontier(&self) -> &Frontier<C> {
        &self.open
    }

    fn reset(&mut self) {
        self.search_tree.clear();
        self.open.clear();
        self.node_map.clear();
        self.iterations = 0;
    }

    /// Adds every neighbour of `current` to the frontier, or re-ranks it if
    /// it was already open and this is a shorter way in.
    fn expand(&mut self, current: SearchTreeIndex) {
        let node = self.search_tree[current].node;
        let g = self.search_tree[current].g;

        for neighbour in self.graph.neighbours(node) {
            let new_g = g + self.graph.distance(node, neighbour);

            // Have we seen this node?
            match self.node_map.get(&neighbour).copied() {
                Some(neighbour_index) if neighbour_index.is_closed() => {
                    // Yes, and we expanded it already. With a consistent
                    // heuristic it can't get any better.
                    continue;
                }
                Some(neighbour_index) => {
                    // Yes, but it's still open. Update it if needed.
                    let n = &mut self.search_tree[neighbour_index];
                    if new_g < n.g {
                        n.reach(current, new_g);
                        self.open.improve(&mut self.search_tree, neighbour_index);
                    }
                }
                None => {
                    let h = self.h(neighbour);
                    self.push_new(neighbour, Some(current), new_g, h);
                }
            }
        }
    }

    /// Takes the open node with the lowest `g + h` and closes it.
    fn select_next(&mut self) -> Option<SearchTreeIndex> {
        let next = self.open.pop(&mut self.search_tree)?;
        let node = self.search_tree[next].node;
        debug_assert!(!self.is_closed(node));
        self.mark_closed(node);
        Some(next)
    }

    fn add_node(
        &mut self,
        node: NodeId,
        parent: Option<SearchTreeIndex>,
        g: C,
        h: C,
    ) -> SearchTreeIndex {
        debug_assert!(!self.node_map.contains_key(&node));
        let node_index = self
            .search_tree
            .push(SearchTreeNode::new(node, parent, g, h));
        self.node_map.insert(node, node_index);
        node_index
    }

    fn push_new(&mut self, node: NodeId, parent: Option<SearchTreeIndex>, g: C, h: C) {
        let node_index = self.add_node(node, parent, g, h);
        self.open.push(&mut self.search_tree, node_index);
    }

    fn mark_closed(&mut self, node: NodeId) {
        match self.node_map.get_mut(&node) {
            Some(node_index) => node_index.set_closed(),
            None => unreachable!("Tried closing {node} without a search node"),
        }
    }

    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "RoutePlanner Stats:")?;
        let s = size_of::<SearchTreeNode<C>>();
        let l = self.search_tree.len();
        writeln!(
            out,
            "  - |Nodes|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let c = self.search_tree.capacity();
        writeln!(
            out,
            "  - |Nodes|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<crate::frontier::AStarHeapNode<C>>();
        let l = self.open.len();
        let c = self.open.capacity();
        writeln!(
            out,
            "  - |Open|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Open|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<(NodeId, SearchTreeIndex)>();
        let l = self.node_map.len();
        let c = self.node_map.capacity();
        writeln!(
            out,
            "  - |Index|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Index|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let expanded_nodes = self.search_tree.len() - self.open.len();
        writeln!(
            out,
            "  - Expanded nodes: {}",
            expanded_nodes.separate_with_commas()
        )?;
        writeln!(
            out,
            "  - Iterations: {}",
            self.iterations.separate_with_commas()
        )?;

        Ok(())
    }
}

impl<G, C> std::fmt::Debug for RoutePlanner<'_, G, C>
where
    G: Graph<C>,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("RoutePlanner")
            .field("graph", self.graph)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("search_tree", &self.search_tree)
            .field("open", &self.open.len())
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Finds a shortest route between two points given as `0..=100` percentages
/// of the map.
pub fn run_search<G, C>(
    graph: &G,
    start_x: f32,
    start_y: f32,
    end_x: f32,
    end_y: f32,
) -> Result<Route<C>, RouteError>
where
    G: Graph<C>,
    C: Cost,
{
    RoutePlanner::from_percent(graph, start_x, start_y, end_x, end_y)?.search()
}
