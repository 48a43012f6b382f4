//! Overlapping overlaps: a node whose two-sided duplications would overlap
//! in the middle of its sequence cannot be carved into disjoint termini.
//! The duplicator anchors the affected biclique edges at the surviving
//! remainder and records them here; after normal splicing, a single bounded
//! stitching pass connects the parent's surviving chain into each
//! intersecting biclique subgraph at the per-edge overlap offset, so the
//! shared interior is represented exactly once.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::biclique::Bicliques;
use crate::error::Result;
use crate::graph::{Edge, GraphView, Handle, HashGraph};
use crate::overlaps::OverlapMap;
use crate::poa::{terminus_path_name, Subgraph};

#[derive(Debug, Clone)]
pub struct OverlappingChild {
    /// Remainder handle the biclique edges were anchored at.
    pub anchor: Handle,
    pub biclique_index: usize,
    pub extent: u64,
}

#[derive(Debug, Clone)]
pub struct OverlappingOverlapNode {
    pub parent_path_name: String,
    /// Per node side (0 = 5', 1 = 3').
    pub children: [Vec<OverlappingChild>; 2],
}

impl OverlappingOverlapNode {
    pub fn new(parent_path_name: String) -> Self {
        OverlappingOverlapNode {
            parent_path_name,
            children: [Vec::new(), Vec::new()],
        }
    }
}

/// Which end of the node an edge endpoint consumes (same convention as the
/// duplicator): 3' for a forward source or reversed sink, 5' otherwise.
fn junction_side(endpoint: usize, handle: Handle) -> bool {
    if endpoint == 0 {
        !handle.is_reverse()
    } else {
        handle.is_reverse()
    }
}

/// Where a spliced terminus's sequence now lives: its subgraph path and the
/// orientation it was threaded with.
struct PoaPaths {
    /// terminus node id -> (path name, participant orientation was reverse)
    by_node: FxHashMap<u64, (String, bool)>,
}

impl PoaPaths {
    fn new(subgraphs: &[Subgraph]) -> Self {
        let mut by_node = FxHashMap::default();
        for subgraph in subgraphs {
            for side in [false, true] {
                for &handle in subgraph.paths_per_handle[side as usize].keys() {
                    by_node.insert(
                        handle.id(),
                        (terminus_path_name(handle, side), handle.is_reverse()),
                    );
                }
            }
        }
        PoaPaths { by_node }
    }
}

/// The parent's surviving spelling, forward-oriented: provenance path steps
/// with every spliced terminus replaced by its subgraph path.
fn effective_chain(
    graph: &HashGraph,
    parent_path_name: &str,
    to_be_destroyed: &FxHashSet<u64>,
    poa: &PoaPaths,
) -> Vec<Handle> {
    let mut chain = Vec::new();
    let Some(steps) = graph.path_steps(parent_path_name) else {
        return chain;
    };
    for &step in steps {
        if to_be_destroyed.contains(&step.id()) {
            if let Some((name, threaded_reverse)) = poa.by_node.get(&step.id()) {
                if let Some(sub) = graph.path_steps(name) {
                    if *threaded_reverse {
                        chain.extend(sub.iter().rev().map(|h| h.flip()));
                    } else {
                        chain.extend_from_slice(sub);
                    }
                    continue;
                }
            }
            // queued for destruction but never spliced; spell it as-is
        }
        chain.push(step);
    }
    chain
}

fn oriented(chain: &[Handle], reverse: bool) -> Vec<Handle> {
    if reverse {
        chain.iter().rev().map(|h| h.flip()).collect()
    } else {
        chain.to_vec()
    }
}

/// The handle beginning at `offset` along the chain, splitting a node when
/// the offset falls inside one. `None` means the offset is at or past the
/// chain's total length.
fn handle_at_offset(
    graph: &mut HashGraph,
    chain: &[Handle],
    offset: u64,
) -> Option<Handle> {
    let mut at = 0u64;
    for &h in chain {
        let len = graph.length(h) as u64;
        if offset == at {
            return Some(h);
        }
        if offset < at + len {
            let pieces = graph.split_handle(h, &[(offset - at) as usize]);
            return Some(pieces[1]);
        }
        at += len;
    }
    None
}

/// Alive continuations following `handle`.
fn continuations(
    graph: &HashGraph,
    handle: Handle,
    to_be_destroyed: &FxHashSet<u64>,
) -> Vec<Handle> {
    let mut out = Vec::new();
    graph.follow_edges(handle, false, &mut |h| {
        if !to_be_destroyed.contains(&h.id()) {
            out.push(h);
        }
        true
    });
    out.sort_unstable();
    out
}

/// Stitch every overlapping-overlap record. Applied once, after normal
/// splicing.
#[allow(clippy::too_many_arguments)]
pub fn splice_overlapping_overlaps(
    graph: &mut HashGraph,
    bicliques: &Bicliques,
    overlaps: &OverlapMap,
    subgraphs: &[Subgraph],
    oo_nodes: &FxHashMap<u64, OverlappingOverlapNode>,
    to_be_destroyed: &FxHashSet<u64>,
) -> Result<()> {
    let poa = PoaPaths::new(subgraphs);
    let mut parent_ids: Vec<u64> = oo_nodes.keys().copied().collect();
    parent_ids.sort_unstable();

    for parent_id in parent_ids {
        let record = oo_nodes[&parent_id].clone();
        for side in [false, true] {
            for oc in &record.children[side as usize] {
                stitch_one(
                    graph,
                    bicliques,
                    overlaps,
                    &poa,
                    to_be_destroyed,
                    &record.parent_path_name,
                    side,
                    oc,
                )?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn stitch_one(
    graph: &mut HashGraph,
    bicliques: &Bicliques,
    overlaps: &OverlapMap,
    poa: &PoaPaths,
    to_be_destroyed: &FxHashSet<u64>,
    parent_path_name: &str,
    side: bool,
    oc: &OverlappingChild,
) -> Result<()> {
    for &edge in &bicliques[oc.biclique_index] {
        let anchor_at = if edge.0.id() == oc.anchor.id() {
            0
        } else if edge.1.id() == oc.anchor.id() {
            1
        } else {
            continue;
        };
        let anchor_handle = if anchor_at == 0 { edge.0 } else { edge.1 };
        if junction_side(anchor_at, anchor_handle) != side {
            continue;
        }
        let (_src_len, sink_len) = overlaps.oriented_lengths(edge)?;

        // Splits happen while locating the entry point, so the exit handle
        // is read fresh afterwards.
        if anchor_at == 0 {
            // Parent supplies the suffix region; exit from the end of its
            // oriented chain into the counterpart's prefix at its offset.
            let entries = entries_into_region(graph, poa, to_be_destroyed, edge.1, sink_len);
            let chain = oriented(
                &effective_chain(graph, parent_path_name, to_be_destroyed, poa),
                anchor_handle.is_reverse(),
            );
            let Some(&exit) = chain.last() else { continue };
            for entry in entries {
                graph.create_edge(Edge(exit, entry));
            }
        } else {
            // Parent supplies the prefix region; the counterpart's spelled
            // end enters the parent's oriented chain past the consumed
            // prefix.
            let chain = oriented(
                &effective_chain(graph, parent_path_name, to_be_destroyed, poa),
                anchor_handle.is_reverse(),
            );
            let entries = match handle_at_offset(graph, &chain, sink_len) {
                Some(entry) => vec![entry],
                None => match chain.last() {
                    Some(&end) => continuations(graph, end, to_be_destroyed),
                    None => continue,
                },
            };
            let exits = region_end(graph, poa, edge.0)?;
            for &exit in &exits {
                for &entry in &entries {
                    graph.create_edge(Edge(exit, entry));
                }
            }
        }
    }
    Ok(())
}

/// The handle(s) at which a traversal enters the region spelled by `sink`
/// (a side-1 participant) `offset` bases past the junction, splitting a
/// node when the offset is interior.
fn entries_into_region(
    graph: &mut HashGraph,
    poa: &PoaPaths,
    to_be_destroyed: &FxHashSet<u64>,
    sink: Handle,
    offset: u64,
) -> Vec<Handle> {
    let chain: Vec<Handle> = match poa.by_node.get(&sink.id()) {
        Some((name, threaded_reverse)) => {
            let steps = graph.path_steps(name).unwrap_or(&[]).to_vec();
            // re-orient the path from threading orientation to `sink`'s
            if *threaded_reverse != sink.is_reverse() {
                steps.iter().rev().map(|h| h.flip()).collect()
            } else {
                steps
            }
        }
        None => {
            // the counterpart is itself an overlapping-overlap anchor:
            // use its node in place
            vec![sink]
        }
    };
    match handle_at_offset(graph, &chain, offset) {
        Some(entry) => vec![entry],
        None => match chain.last() {
            Some(&end) => continuations(graph, end, to_be_destroyed),
            None => Vec::new(),
        },
    }
}

/// The handle(s) at which the region spelled by `source` (a side-0
/// participant) ends.
fn region_end(graph: &HashGraph, poa: &PoaPaths, source: Handle) -> Result<Vec<Handle>> {
    match poa.by_node.get(&source.id()) {
        Some((name, threaded_reverse)) => {
            let steps = graph.path_steps(name).unwrap_or(&[]);
            if steps.is_empty() {
                return Ok(Vec::new());
            }
            if *threaded_reverse != source.is_reverse() {
                Ok(vec![steps[0].flip()])
            } else {
                Ok(vec![*steps.last().unwrap()])
            }
        }
        // counterpart anchored in place: its node end is the region end
        None => Ok(vec![source]),
    }
}
