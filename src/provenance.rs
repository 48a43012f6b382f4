//! Provenance: which interval of which original node every surviving node
//! came from.
//!
//! Middle pieces of a node are read straight off its preserved path; the
//! duplicated termini are traced through the biclique subgraph paths that
//! replaced them. Intervals are stored inclusive on the parent's forward
//! strand and written half-open.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::biclique::{BicliqueEdgeIndex, Bicliques};
use crate::error::Result;
use crate::graph::HashGraph;
use crate::node_info::NodeInfo;
use crate::overlaps::OverlapMap;
use crate::poa::terminus_path_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProvenanceInfo {
    pub parent: u64,
    pub start: u64,
    /// inclusive
    pub stop: u64,
    pub reversal: bool,
}

pub type ProvenanceMap = BTreeMap<u64, BTreeSet<ProvenanceInfo>>;

#[allow(clippy::too_many_arguments)]
pub fn compute_provenance(
    graph: &HashGraph,
    original_node_count: u64,
    node_to_biclique_edge: &[Vec<BicliqueEdgeIndex>],
    child_to_parent: &FxHashMap<u64, (u64, bool)>,
    resolve_to_parent: &FxHashMap<u64, (u64, bool)>,
    bicliques: &Bicliques,
    overlaps: &OverlapMap,
    to_be_destroyed: &FxHashSet<u64>,
) -> Result<ProvenanceMap> {
    let mut provenance: ProvenanceMap = BTreeMap::new();

    for parent_node_id in 1..=original_node_count {
        let parent_path_name = parent_node_id.to_string();
        let Some(steps) = graph.path_steps(&parent_path_name) else {
            continue;
        };

        // Direct intervals for the surviving middle pieces; duplicated
        // termini sit at the path's ends and are handled below.
        let mut parent_index = 0u64;
        let mut parent_length = 0u64;
        for step in steps {
            let length = graph.length(*step) as u64;
            parent_length += length;
            let id = step.id();
            if !child_to_parent.contains_key(&id) && !to_be_destroyed.contains(&id) {
                provenance.entry(id).or_default().insert(ProvenanceInfo {
                    parent: parent_node_id,
                    start: parent_index,
                    stop: parent_index + length - 1,
                    reversal: false,
                });
            }
            parent_index += length;
        }
        // count the rest of the path toward the parent's full length
        // (already complete: the loop above never breaks)

        // The graph has been edited and harmonization may have flipped
        // edges, so re-factor the overlaps per side against the child map.
        let node_info = NodeInfo::with_child_map(
            node_to_biclique_edge,
            resolve_to_parent,
            bicliques,
            overlaps,
            parent_node_id,
        )?;

        for side in 0..2 {
            for (&biclique_index, overlap_infos) in &node_info.factored_overlaps[side] {
                // the longest overlap defines this biclique's terminus
                let overlap_info = overlap_infos[0];
                let stored = bicliques[biclique_index][overlap_info.edge_index];
                let (canonical, _) = overlaps.canonicalize_and_find(stored)?;

                let resolve = |id: u64| {
                    resolve_to_parent
                        .get(&id)
                        .map(|&(p, _)| p)
                        .unwrap_or(id)
                };
                // On a self-loop both endpoints resolve to this node; pick
                // the one whose junction is the side being walked.
                let left_matches = resolve(canonical.0.id()) == parent_node_id
                    && (!canonical.0.is_reverse()) as usize == side;
                let (child_id, reversal, mut biclique_side, start) = if left_matches {
                    let reversal = canonical.0.is_reverse();
                    let start = if reversal {
                        0
                    } else {
                        parent_length - overlap_info.length
                    };
                    (canonical.0.id(), reversal, false, start)
                } else {
                    let reversal = canonical.1.is_reverse();
                    let start = if reversal {
                        parent_length - overlap_info.length
                    } else {
                        0
                    };
                    (canonical.1.id(), reversal, true, start)
                };
                if canonical != stored {
                    biclique_side = !biclique_side;
                }

                let child_path_name =
                    terminus_path_name(crate::graph::Handle::forward(child_id), biclique_side);
                let Some(child_steps) = graph.path_steps(&child_path_name) else {
                    // overlapping-overlap participants have no subgraph path;
                    // their interval is covered by the parent's own chain
                    continue;
                };
                let mut at = start;
                for step in child_steps {
                    let length = graph.length(*step) as u64;
                    provenance
                        .entry(step.id())
                        .or_default()
                        .insert(ProvenanceInfo {
                            parent: parent_node_id,
                            start: at,
                            stop: at + length - 1,
                            reversal,
                        });
                    at += length;
                }
            }
        }
    }
    Ok(provenance)
}

/// One line per surviving node:
/// `<child>\t<parent>[start:stop+1]<+/->,...`
pub fn write_provenance<W: Write>(provenance: &ProvenanceMap, writer: &mut W) -> Result<()> {
    for (child, parents) in provenance {
        write!(writer, "{child}\t")?;
        let mut first = true;
        for info in parents {
            if !first {
                write!(writer, ",")?;
            }
            first = false;
            write!(
                writer,
                "{}[{}:{}]{}",
                info.parent,
                info.start,
                info.stop + 1,
                if info.reversal { '-' } else { '+' }
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
