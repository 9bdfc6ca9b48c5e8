//! The open list.
//!
//! A d-ary min-heap of `(AStarRank, SearchTreeIndex)` entries. It's intrusive:
//! every open `SearchTreeNode` knows its position in the heap, so a node
//! reached through a better path can be moved up without searching for it.
use std::cmp::min;

use crate::cost::Cost;
use crate::derank::derank;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;

// Heap 101
//
// ```text
//                                   0
//            1         2        3        4     ...      8
//   9 .. 16  17 .. 24 ...
// ```
//
// With arity `A`, from any index `i`,
//   - Up:          `(i-1) / A`
//   - First child: `A*i + 1`
//   - Last child:  `A*(i+1)`
//
// The last level will often be incomplete.
const HEAP_ARITY: usize = 8usize;

#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    debug_assert!(i > 0, "The root has no parent");
    (i - 1) / HEAP_ARITY
}
#[inline(always)]
#[must_use]
fn first_child(i: usize) -> usize {
    (HEAP_ARITY * i) + 1
}
#[inline(always)]
#[must_use]
fn last_child(i: usize) -> usize {
    HEAP_ARITY * (i + 1)
}

/// The ranking tuple for A*
///
/// We prefer better f-values, and tie break for lower h, which favours nodes
/// closer to the end among equally promising ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank<C: Cost> {
    f: C,
    h: C,
}

impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn new(g: C, h: C) -> Self {
        Self {
            f: g.saturating_add(&h),
            h,
        }
    }
    /// Improves `g` in `Rank{f, h}` without recomputing `h`.
    pub fn improve_g(&mut self, new_g: C) {
        let f = new_g.saturating_add(&self.h);
        debug_assert!(f <= self.f);
        self.f = f;
    }
    pub fn f(&self) -> C {
        self.f
    }
    pub fn h(&self) -> C {
        self.h
    }
}

/// A heap entry.
///
/// Heap entries carry just ranking information and an index to the actual
/// search node, so heap operations move as little data as possible.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct AStarHeapNode<C>
where
    C: Cost,
{
    /// The rank of this node that defines how good it is.
    pub rank: AStarRank<C>,
    /// The index of this node in the search tree.
    pub node_index: SearchTreeIndex,
}

impl<C: Cost> PartialEq for AStarHeapNode<C> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl<C: Cost> Eq for AStarHeapNode<C> {}

impl<C: Cost> PartialOrd for AStarHeapNode<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<C: Cost> Ord for AStarHeapNode<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// Discovered nodes waiting to be expanded, best first.
///
/// Operations take the `SearchTree` the entries point into to keep the
/// intrusive indices in sync.
///
/// ```pseudocode
/// for (i, hn) in self.open.enumerate():
///   assert_eq(search_tree[hn.node_index].heap_index, i)
/// ```
#[derive(Debug, Default)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct Frontier<C>
where
    C: Cost,
{
    open: Vec<AStarHeapNode<C>>,
}

impl<C> Frontier<C>
where
    C: Cost,
{
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            open: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.open.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.open.capacity()
    }

    /// Entries in heap order, which is only sorted at the top.
    pub fn iter(&self) -> std::slice::Iter<'_, AStarHeapNode<C>> {
        self.open.iter()
    }

    /// The entry `pop` would return.
    pub fn peek(&self) -> Option<&AStarHeapNode<C>> {
        self.open.first()
    }

    pub(crate) fn clear(&mut self) {
        self.open.clear();
    }

    /// Adds a node that is not in the frontier yet.
    pub(crate) fn push(&mut self, tree: &mut SearchTree<C>, node_index: SearchTreeIndex) {
        self.verify_heap(tree);
        debug_assert!(!node_index.is_closed());

        let node = &mut tree[node_index];
        let heap_index = self.open.len(); // Future heap_index
        node.heap_index = heap_index;
        self.open.push(AStarHeapNode {
            rank: AStarRank::new(node.g, node.h),
            node_index,
        });
        self.sift_up(tree, heap_index);

        self.verify_heap(tree);
    }

    /// Re-ranks an open node after its `g` improved (decrease-key).
    pub(crate) fn improve(&mut self, tree: &mut SearchTree<C>, node_index: SearchTreeIndex) {
        let node = &tree[node_index];
        let heap_index = node.heap_index;
        debug_assert!(heap_index < self.open.len(), "Node is not open");
        debug_assert!(self.open[heap_index].node_index == node_index, "Node is out of sync.");

        self.open[heap_index].rank.improve_g(node.g);
        self.sift_up(tree, heap_index);

        self.verify_heap(tree);
    }

    /// Removes the best node.
    #[must_use]
    pub(crate) fn pop(&mut self, tree: &mut SearchTree<C>) -> Option<SearchTreeIndex> {
        self.verify_heap(tree);

        let heap_node = match self.open.len() {
            0 | 1 => self.open.pop(),
            _ => self.pop_non_trivial_heap(tree),
        };

        self.verify_heap(tree);
        heap_node.map(|n| n.node_index)
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    fn verify_heap(&self, _tree: &SearchTree<C>) {
        // All good... (hopefully)
    }
    #[cfg(feature = "verify")]
    fn verify_heap(&self, tree: &SearchTree<C>) {
        // Every node,
        for (i, e) in self.open.iter().enumerate() {
            // - Has the right intrusive index set.
            assert_eq!(tree[e.node_index].heap_index, i);
            // - Has the rank of its search node.
            assert_eq!(e.rank, AStarRank::new(tree[e.node_index].g, tree[e.node_index].h));

            // - Goes after its parent node, if any.
            if i == 0 {
                continue;
            }
            let p = up(i);
            assert!(
                self.open[p].rank <= self.open[i].rank,
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.open[p],
                self.open[i],
                self.open.len(),
            );
        }
    }

    /// Pops the top node from a heap with at least 2 elements.
    ///
    /// Works by unfairly sifting down the top node to the last level, where it
    /// can be swapped with the very last element of the array and popped.
    /// Comparing children with each other instead of with the sinking node
    /// saves one comparison per level.
    fn pop_non_trivial_heap(&mut self, tree: &mut SearchTree<C>) -> Option<AStarHeapNode<C>> {
        debug_assert!(self.open.len() >= 2);

        let len = self.open.len();
        let last = len - 1;

        // 1. Pretend there's a hole at the root, and bubble the best child up
        //    until the hole reaches the bottom.
        let mut hole = 0;
        loop {
            let child = first_child(hole);
            if child >= len {
                break;
            }
            debug_assert_eq!(child + HEAP_ARITY, last_child(hole) + 1);
            let child = child + derank(&self.open[child..min(child + HEAP_ARITY, len)]);

            self.half_swap_down(tree, hole, child);
            hole = child;
        }

        // 2. If the hole is not the last element, swap it for the last one,
        //    which may need to go up.
        debug_assert!(hole <= last, "The hole={hole} is past last={last}");
        if hole != last {
            self.half_swap_down(tree, hole, last);
            self.sift_up(tree, hole);
        }

        // 3. Now the last element is the one that was at the top.
        self.open.pop()
    }

    /// Raises a node.
    /// Returns its new index.
    fn sift_up(&mut self, tree: &mut SearchTree<C>, index: usize) -> usize {
        debug_assert!(
            index < self.open.len(),
            "Node is way out of sync. Index out of bounds..."
        );

        let mut pos = index;
        while pos > 0 {
            let parent = up(pos);
            if self.open[parent].rank <= self.open[pos].rank {
                break;
            }
            self.swap(tree, parent, pos);
            pos = parent;
        }
        pos
    }

    // Swapping primitives
    /// Swaps two elements in the heap, keeping the intrusive indices in sync.
    ///
    /// For consistency in calling code `l < r` is checked.
    #[inline(always)]
    fn swap(&mut self, tree: &mut SearchTree<C>, l: usize, r: usize) {
        debug_assert!(l < r, "Swap({l}, {r}) uses wrong argument order");

        self.open.swap(l, r);
        tree[self.open[l].node_index].heap_index = l;
        tree[self.open[r].node_index].heap_index = r;
        debug_assert!(
            self.open[l].rank <= self.open[r].rank,
            "Swaps must locally restore the heap invariant."
        );
    }
    /// Swaps two elements in the heap.
    ///
    /// Only keeps the index of the element going up in sync since the one
    /// going down is the popped top node.
    #[inline(always)]
    fn half_swap_down(&mut self, tree: &mut SearchTree<C>, l: usize, r: usize) {
        debug_assert!(l < r, "HalfSwapDown({l}, {r}) is wrong");

        self.open.swap(l, r);
        tree[self.open[l].node_index].heap_index = l;
    }
}
