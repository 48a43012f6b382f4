//! Terminus duplication.
//!
//! Each node's prefix/suffix is split into a staircase of duplicated
//! sub-nodes, one per biclique extent on that side, so that every biclique
//! can later be represented by nodes that share an entire end. Biclique
//! edges are retargeted onto the staircase children; edges whose extent does
//! not fit in the remaining sequence are anchored at the remainder and
//! recorded as overlapping overlaps for the post-splice stitching pass.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::biclique::{BicliqueEdgeIndex, Bicliques};
use crate::error::Result;
use crate::graph::{Edge, GraphView, Handle, HashGraph};
use crate::node_info::NodeInfo;
use crate::overlaps::OverlapMap;
use crate::overlapping::{OverlappingChild, OverlappingOverlapNode};

/// Split `parent` into `[rest, p1, d2, ...]` where `p1` is the carved prefix
/// of the largest extent and each further `d` is a fresh duplicate of a
/// shorter prefix, wired into the remainder. `children[i]` has length
/// `extents[i - 1]`.
pub fn duplicate_prefix(
    graph: &mut HashGraph,
    extents: &[u64],
    parent: Handle,
) -> VecDeque<Handle> {
    let largest = extents[0] as usize;
    debug_assert!(largest < graph.length(parent));
    let pieces = graph.split_handle(parent, &[largest]);
    let prefix = pieces[0];
    let rest = pieces[1];
    let mut children = VecDeque::from([rest, prefix]);
    let prefix_seq = graph.sequence(prefix);
    for &extent in &extents[1..] {
        let dup = graph.create_node(prefix_seq[..extent as usize].to_vec());
        graph.create_edge(Edge(dup, rest));
        children.push_back(dup);
    }
    children
}

/// Mirror image of [`duplicate_prefix`] for the 3' end.
pub fn duplicate_suffix(
    graph: &mut HashGraph,
    extents: &[u64],
    parent: Handle,
) -> VecDeque<Handle> {
    let len = graph.length(parent);
    let largest = extents[0] as usize;
    debug_assert!(largest < len);
    let pieces = graph.split_handle(parent, &[len - largest]);
    let rest = pieces[0];
    let suffix = pieces[1];
    let mut children = VecDeque::from([rest, suffix]);
    let suffix_seq = graph.sequence(suffix);
    for &extent in &extents[1..] {
        let start = suffix_seq.len() - extent as usize;
        let dup = graph.create_node(suffix_seq[start..].to_vec());
        graph.create_edge(Edge(rest, dup));
        children.push_back(dup);
    }
    children
}

/// Which end of the node a biclique-edge endpoint consumes: the 3' end for
/// a forward source or reversed sink, the 5' end otherwise.
fn junction_side(endpoint: usize, handle: Handle) -> bool {
    if endpoint == 0 {
        !handle.is_reverse()
    } else {
        handle.is_reverse()
    }
}

fn remove_participating_edges(
    graph: &mut HashGraph,
    bicliques: &Bicliques,
    touched_bicliques: &[usize],
    node_id: u64,
) {
    for &b in touched_bicliques {
        for &edge in &bicliques[b] {
            if edge.0.id() == node_id || edge.1.id() == node_id {
                graph.destroy_edge(edge);
            }
        }
    }
}

/// Retarget every endpoint of the touched bicliques that still references
/// `old_id`. Endpoints on the duplicated side move to their biclique's
/// staircase child (or to the remainder when the biclique has no carved
/// child); endpoints on the opposite side move to the remainder.
#[allow(clippy::too_many_arguments)]
fn update_biclique_edges(
    graph: &mut HashGraph,
    bicliques: &mut Bicliques,
    overlaps: &mut OverlapMap,
    old_id: u64,
    duped_side: bool,
    carved_position: &FxHashMap<usize, usize>,
    touched_bicliques: &[usize],
    children: &VecDeque<Handle>,
) {
    for &b in touched_bicliques {
        for edge_index in 0..bicliques[b].len() {
            let old_edge = bicliques[b][edge_index];
            let mut endpoints = [old_edge.0, old_edge.1];
            let mut touched = false;
            for (i, endpoint) in endpoints.iter_mut().enumerate() {
                if endpoint.id() != old_id {
                    continue;
                }
                let child = if junction_side(i, *endpoint) == duped_side {
                    match carved_position.get(&b) {
                        Some(&pos) => children[pos + 1],
                        None => children[0],
                    }
                } else {
                    children[0]
                };
                *endpoint = Handle::new(child.id(), endpoint.is_reverse());
                touched = true;
            }
            if touched {
                let new_edge = Edge(endpoints[0], endpoints[1]);
                graph.create_edge(new_edge);
                overlaps.update_edge(old_edge, new_edge);
                bicliques[b][edge_index] = new_edge;
            }
        }
    }
}

pub struct Duplicator<'a> {
    node_to_biclique_edge: &'a [Vec<BicliqueEdgeIndex>],
    /// child node id -> (original node id, side of the original)
    pub child_to_parent: FxHashMap<u64, (u64, bool)>,
    /// original node id -> duplicated children with their side
    pub parent_to_children: FxHashMap<u64, Vec<(Handle, bool)>>,
    pub overlapping_overlaps: FxHashMap<u64, OverlappingOverlapNode>,
}

impl<'a> Duplicator<'a> {
    pub fn new(node_to_biclique_edge: &'a [Vec<BicliqueEdgeIndex>]) -> Self {
        Duplicator {
            node_to_biclique_edge,
            child_to_parent: FxHashMap::default(),
            parent_to_children: FxHashMap::default(),
            overlapping_overlaps: FxHashMap::default(),
        }
    }

    fn register_child(&mut self, child: Handle, parent: u64, side: bool) {
        self.child_to_parent.insert(child.id(), (parent, side));
        self.parent_to_children
            .entry(parent)
            .or_default()
            .push((child, side));
    }

    fn register_overlapping(
        &mut self,
        parent: u64,
        side: bool,
        anchor: Handle,
        biclique_index: usize,
        extent: u64,
    ) {
        self.overlapping_overlaps
            .entry(parent)
            .or_insert_with(|| OverlappingOverlapNode::new(parent.to_string()))
            .children[side as usize]
            .push(OverlappingChild {
                anchor,
                biclique_index,
                extent,
            });
    }

    /// Duplicate the termini of every original node, in ascending id order.
    pub fn duplicate_all_node_termini(
        &mut self,
        graph: &mut HashGraph,
        bicliques: &mut Bicliques,
        overlaps: &mut OverlapMap,
        original_node_count: u64,
    ) -> Result<()> {
        for node_id in 1..=original_node_count {
            self.duplicate_one_node(graph, bicliques, overlaps, node_id)?;
        }
        Ok(())
    }

    fn duplicate_one_node(
        &mut self,
        graph: &mut HashGraph,
        bicliques: &mut Bicliques,
        overlaps: &mut OverlapMap,
        node_id: u64,
    ) -> Result<()> {
        let info = NodeInfo::new(self.node_to_biclique_edge, bicliques, overlaps, node_id)?;
        let (extents, biclique_order) = info.sorted_biclique_extents();
        if extents[0].is_empty() && extents[1].is_empty() {
            return Ok(());
        }

        let mut touched: Vec<usize> = biclique_order[0]
            .iter()
            .chain(biclique_order[1].iter())
            .copied()
            .collect();
        touched.sort_unstable();
        touched.dedup();

        let mut parent_handle = Handle::forward(node_id);
        remove_participating_edges(graph, bicliques, &touched, node_id);

        for side in [false, true] {
            let s = side as usize;
            if extents[s].is_empty() {
                continue;
            }
            let available = graph.length(parent_handle) as u64;

            // An extent that consumes the whole remaining sequence cannot be
            // carved into a dedicated terminus; it is anchored in place and
            // finished by the overlapping-overlap stitch.
            let mut carved: Vec<(usize, u64)> = Vec::new();
            let mut overflowing: Vec<(usize, u64)> = Vec::new();
            for (&b, &extent) in biclique_order[s].iter().zip(extents[s].iter()) {
                if extent < available {
                    carved.push((b, extent));
                } else {
                    overflowing.push((b, extent));
                }
            }

            if !carved.is_empty() {
                let carve_extents: Vec<u64> = carved.iter().map(|&(_, e)| e).collect();
                let children = if side {
                    duplicate_suffix(graph, &carve_extents, parent_handle)
                } else {
                    duplicate_prefix(graph, &carve_extents, parent_handle)
                };
                for &child in children.iter().skip(1) {
                    self.register_child(child, node_id, side);
                }
                let positions: FxHashMap<usize, usize> = carved
                    .iter()
                    .enumerate()
                    .map(|(pos, &(b, _))| (b, pos))
                    .collect();
                update_biclique_edges(
                    graph,
                    bicliques,
                    overlaps,
                    parent_handle.id(),
                    side,
                    &positions,
                    &touched,
                    &children,
                );
                parent_handle = children[0];
            }

            for (b, extent) in overflowing {
                self.register_overlapping(node_id, side, parent_handle, b, extent);
            }
        }

        // Any biclique edge left untouched by the updates (trivial terminus,
        // overflow anchored in place) still needs its graph edge back.
        for &b in &touched {
            for &edge in &bicliques[b] {
                if !graph.has_edge(edge.0, edge.1) {
                    graph.create_edge(edge);
                }
            }
        }
        Ok(())
    }
}
