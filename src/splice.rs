//! Splices the per-biclique subgraphs back into the main graph.
//!
//! Each subgraph is copied in with shifted node ids, then every participant
//! terminus is replaced by its path: the terminus's surviving parent is wired
//! to the path head (left participants) or from the path tail (right
//! participants), and termini that no longer participate on either side are
//! queued for destruction.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{BluntifyError, Result};
use crate::graph::{Edge, GraphView, Handle, HashGraph};
use crate::overlapping::OverlappingOverlapNode;
use crate::overlaps::OverlapMap;
use crate::poa::Subgraph;

/// True when `node_id` belongs to the duplication family of a node with
/// overlapping overlaps, whose wiring is finished by the stitching pass.
fn has_overlapping_parent(
    node_id: u64,
    child_to_parent: &FxHashMap<u64, (u64, bool)>,
    overlapping: &FxHashMap<u64, OverlappingOverlapNode>,
) -> bool {
    if overlapping.contains_key(&node_id) {
        return true;
    }
    match child_to_parent.get(&node_id) {
        Some(&(parent, _)) => overlapping.contains_key(&parent),
        None => false,
    }
}

pub fn splice_subgraphs(
    graph: &mut HashGraph,
    subgraphs: &[Subgraph],
    overlaps: &OverlapMap,
    child_to_parent: &FxHashMap<u64, (u64, bool)>,
    overlapping: &FxHashMap<u64, OverlappingOverlapNode>,
    to_be_destroyed: &mut FxHashSet<u64>,
) -> Result<()> {
    for subgraph in subgraphs {
        subgraph.graph.copy_into(graph);

        for side in [false, true] {
            let mut handles: Vec<Handle> = subgraph.paths_per_handle[side as usize]
                .keys()
                .copied()
                .collect();
            handles.sort_unstable();
            for handle in handles {
                let info = &subgraph.paths_per_handle[side as usize][&handle];
                let node_id = handle.id();

                let steps = graph
                    .path_steps(&info.path_name)
                    .expect("subgraph path lost in copy")
                    .to_vec();
                let head = steps[0];
                let tail = *steps.last().unwrap();

                // The terminus's parent: its still-alive neighbor away from
                // the junction.
                let mut parents: BTreeSet<Handle> = BTreeSet::new();
                graph.follow_edges(handle, !side, &mut |h| {
                    if !to_be_destroyed.contains(&h.id()) {
                        parents.insert(h);
                    }
                    true
                });

                if parents.is_empty()
                    && !has_overlapping_parent(node_id, child_to_parent, overlapping)
                {
                    return Err(BluntifyError::OrphanedTerminus(node_id));
                }

                for &parent in &parents {
                    if !side {
                        graph.create_edge(Edge(parent, head));
                    } else {
                        graph.create_edge(Edge(tail, parent));
                    }
                }

                // Already-blunt (0M) links that rode along onto this terminus
                // carry over to the spliced path before the terminus dies.
                let mut junction_neighbors = Vec::new();
                graph.follow_edges(handle, side, &mut |h| {
                    junction_neighbors.push(h);
                    true
                });
                for u in junction_neighbors {
                    let stray = if !side {
                        Edge(handle, u)
                    } else {
                        Edge(u, handle)
                    };
                    // a junction edge with a live nonzero overlap record is a
                    // biclique edge; everything else rode along on a split
                    let is_stray = match overlaps.oriented_lengths(stray) {
                        Ok((0, 0)) | Err(_) => true,
                        Ok(_) => false,
                    };
                    if is_stray {
                        if !side {
                            graph.create_edge(Edge(tail, u));
                        } else {
                            graph.create_edge(Edge(u, head));
                        }
                    }
                }

                // A terminus participating via both orientations (reversing
                // loop) is fully represented once both its paths are wired;
                // only same-handle dual participation keeps it alive.
                let other = &subgraph.paths_per_handle[!side as usize];
                if !other.contains_key(&handle) {
                    to_be_destroyed.insert(node_id);
                }
            }
        }
    }
    Ok(())
}
