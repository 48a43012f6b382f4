//! Bipartite view over one block of an adjacency component, and the
//! subtractive overlay that hides suppressed edges without touching the host
//! graph.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::adjacency::for_each_adjacent_side;
use crate::graph::{Edge, GraphView, Handle};
use crate::overlaps::OverlapMap;

/// A read-only overlay that filters a set of suppressed edges out of the host
/// graph. Used by cover simplification so that removing dominated edges never
/// loses information from the host.
pub struct SubtractiveGraph<'a> {
    host: &'a dyn GraphView,
    subtracted: FxHashSet<Edge>,
}

impl<'a> SubtractiveGraph<'a> {
    pub fn new(host: &'a dyn GraphView) -> Self {
        SubtractiveGraph {
            host,
            subtracted: FxHashSet::default(),
        }
    }

    pub fn subtract_edge(&mut self, a: Handle, b: Handle) {
        self.subtracted.insert(Edge(a, b).canonical());
    }

    pub fn num_subtracted(&self) -> usize {
        self.subtracted.len()
    }
}

impl GraphView for SubtractiveGraph<'_> {
    fn follow_edges(&self, handle: Handle, go_left: bool, visit: &mut dyn FnMut(Handle) -> bool) {
        self.host.follow_edges(handle, go_left, &mut |other| {
            let edge = if go_left {
                Edge(other, handle)
            } else {
                Edge(handle, other)
            };
            if self.subtracted.contains(&edge.canonical()) {
                true
            } else {
                visit(other)
            }
        });
    }

    fn has_edge(&self, a: Handle, b: Handle) -> bool {
        self.host.has_edge(a, b) && !self.subtracted.contains(&Edge(a, b).canonical())
    }
}

/// One bipartite block: two canonically ordered side lists plus live
/// adjacency reads against a graph view (host or subtractive).
pub struct BipartiteGraph<'a> {
    graph: &'a dyn GraphView,
    overlaps: &'a OverlapMap,
    left: Vec<Handle>,
    right: Vec<Handle>,
    left_index: FxHashMap<Handle, usize>,
    right_index: FxHashMap<Handle, usize>,
}

impl<'a> BipartiteGraph<'a> {
    pub fn new(
        graph: &'a dyn GraphView,
        overlaps: &'a OverlapMap,
        left: &[Handle],
        right: &[Handle],
    ) -> Self {
        let mut left = left.to_vec();
        let mut right = right.to_vec();
        left.sort_unstable();
        right.sort_unstable();
        let left_index = left.iter().enumerate().map(|(i, &h)| (h, i)).collect();
        let right_index = right.iter().enumerate().map(|(i, &h)| (h, i)).collect();
        BipartiteGraph {
            graph,
            overlaps,
            left,
            right,
            left_index,
            right_index,
        }
    }

    pub fn graph(&self) -> &dyn GraphView {
        self.graph
    }

    pub fn left(&self) -> &[Handle] {
        &self.left
    }

    pub fn right(&self) -> &[Handle] {
        &self.right
    }

    pub fn left_size(&self) -> usize {
        self.left.len()
    }

    pub fn right_size(&self) -> usize {
        self.right.len()
    }

    pub fn left_index_of(&self, side: Handle) -> Option<usize> {
        self.left_index.get(&side).copied()
    }

    pub fn right_index_of(&self, side: Handle) -> Option<usize> {
        self.right_index.get(&side).copied()
    }

    pub fn is_left(&self, side: Handle) -> bool {
        self.left_index.contains_key(&side)
    }

    /// Visit the sides adjacent to `side` within this block.
    pub fn for_each_adjacent_side(&self, side: Handle, visit: &mut dyn FnMut(Handle) -> bool) {
        let opposite = if self.is_left(side) {
            &self.right_index
        } else {
            &self.left_index
        };
        for_each_adjacent_side(self.graph, self.overlaps, side, &mut |s| {
            if opposite.contains_key(&s) {
                visit(s)
            } else {
                true
            }
        });
    }

    /// Adjacent sides as a sorted list.
    pub fn adjacent_sides(&self, side: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        self.for_each_adjacent_side(side, &mut |s| {
            out.push(s);
            true
        });
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn get_degree(&self, side: Handle) -> usize {
        let mut n = 0;
        self.for_each_adjacent_side(side, &mut |_| {
            n += 1;
            true
        });
        n
    }

    pub fn edge_count(&self) -> usize {
        self.left.iter().map(|&l| self.get_degree(l)).sum()
    }
}
