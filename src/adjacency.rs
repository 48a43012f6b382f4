//! Adjacency components over node sides.
//!
//! A *side* is the handle pointing into a junction: the edge `(a, b)` joins
//! side `a` to side `flip(b)`. Components are maximal side sets connected by
//! edges with a nonzero overlap; already-blunt (`0M`) links are left alone
//! and pass through to the output untouched.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::graph::{Edge, GraphView, Handle};
use crate::overlaps::OverlapMap;

/// Visit the sides sharing a junction with `side`, skipping zero overlaps.
pub fn for_each_adjacent_side<G: GraphView + ?Sized>(
    graph: &G,
    overlaps: &OverlapMap,
    side: Handle,
    visit: &mut dyn FnMut(Handle) -> bool,
) {
    let mut partners = Vec::new();
    graph.follow_edges(side, false, &mut |t| {
        partners.push(t);
        true
    });
    for t in partners {
        if let Ok((u, v)) = overlaps.oriented_lengths(Edge(side, t)) {
            if u == 0 && v == 0 {
                continue;
            }
        }
        if !visit(t.flip()) {
            return;
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdjacencyComponent {
    pub sides: Vec<Handle>,
}

impl AdjacencyComponent {
    pub fn size(&self) -> usize {
        self.sides.len()
    }

    /// 2-color the component and hand each bipartite block to `visit` as a
    /// `(left, right)` pair of sorted side lists. A bipartite component is a
    /// single block; in a non-bipartite one, every odd (same-color) edge
    /// becomes its own singleton block.
    pub fn decompose_into_bipartite_blocks<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        overlaps: &OverlapMap,
        visit: &mut dyn FnMut(&[Handle], &[Handle]) -> Result<()>,
    ) -> Result<()> {
        let mut color: FxHashMap<Handle, bool> = FxHashMap::default();
        let mut odd_edges: Vec<(Handle, Handle)> = Vec::new();
        let seed = self.sides[0];
        color.insert(seed, false);
        let mut queue = VecDeque::from([seed]);
        while let Some(here) = queue.pop_front() {
            let here_color = color[&here];
            let mut partners = Vec::new();
            for_each_adjacent_side(graph, overlaps, here, &mut |s| {
                partners.push(s);
                true
            });
            for partner in partners {
                match color.get(&partner) {
                    None => {
                        color.insert(partner, !here_color);
                        queue.push_back(partner);
                    }
                    Some(&c) if c == here_color => {
                        let pair = if here <= partner {
                            (here, partner)
                        } else {
                            (partner, here)
                        };
                        if !odd_edges.contains(&pair) {
                            odd_edges.push(pair);
                        }
                    }
                    Some(_) => {}
                }
            }
        }

        let mut left: Vec<Handle> = Vec::new();
        let mut right: Vec<Handle> = Vec::new();
        for &side in &self.sides {
            match color.get(&side) {
                Some(false) => left.push(side),
                Some(true) => right.push(side),
                // unreachable from the seed only if the component was built
                // over a different edge filter; keep it out of the blocks
                None => {}
            }
        }
        left.sort_unstable();
        right.sort_unstable();
        if !left.is_empty() && !right.is_empty() {
            visit(&left, &right)?;
        }
        for (u, v) in odd_edges {
            visit(&[u], &[v])?;
        }
        Ok(())
    }
}

/// Group all junction sides into adjacency components, deterministically
/// ordered by their smallest member.
pub fn compute_all_adjacency_components(
    graph: &crate::graph::HashGraph,
    overlaps: &OverlapMap,
) -> Vec<AdjacencyComponent> {
    let mut sides: Vec<Handle> = Vec::new();
    graph.for_each_handle(&mut |h| {
        for orient in [h, h.flip()] {
            let mut busy = false;
            for_each_adjacent_side(graph, overlaps, orient, &mut |_| {
                busy = true;
                false
            });
            if busy {
                sides.push(orient);
            }
        }
    });
    sides.sort_unstable();

    let mut visited: FxHashSet<Handle> = FxHashSet::default();
    let mut components = Vec::new();
    for &seed in &sides {
        if visited.contains(&seed) {
            continue;
        }
        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);
        visited.insert(seed);
        while let Some(here) = queue.pop_front() {
            members.push(here);
            for_each_adjacent_side(graph, overlaps, here, &mut |s| {
                if visited.insert(s) {
                    queue.push_back(s);
                }
                true
            });
        }
        members.sort_unstable();
        components.push(AdjacencyComponent { sides: members });
    }
    components
}
