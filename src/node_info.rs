//! Per-node factorization of biclique memberships.
//!
//! For one original node, bins every biclique edge it participates in by the
//! node side the overlap consumes (0 = 5' end, 1 = 3' end on the forward
//! strand) and by biclique, keeping each bin sorted by overlap length
//! descending. Self-loops land on both sides.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::biclique::{BicliqueEdgeIndex, Bicliques};
use crate::error::{BluntifyError, Result};
use crate::overlaps::OverlapMap;

#[derive(Debug, Clone, Copy)]
pub struct OverlapInfo {
    pub edge_index: usize,
    pub length: u64,
}

#[derive(Debug)]
pub struct NodeInfo {
    pub node_id: u64,
    /// side -> biclique index -> overlaps, longest first
    pub factored_overlaps: [BTreeMap<usize, Vec<OverlapInfo>>; 2],
}

impl NodeInfo {
    /// Factor against the graph as it currently stands; endpoints are
    /// matched by node id directly.
    pub fn new(
        node_to_biclique_edge: &[Vec<BicliqueEdgeIndex>],
        bicliques: &Bicliques,
        overlaps: &OverlapMap,
        node_id: u64,
    ) -> Result<Self> {
        Self::build(node_to_biclique_edge, bicliques, overlaps, node_id, &|id| id)
    }

    /// Factor after the graph was edited: endpoints are first resolved to
    /// their original parent through the child map.
    pub fn with_child_map(
        node_to_biclique_edge: &[Vec<BicliqueEdgeIndex>],
        child_to_parent: &FxHashMap<u64, (u64, bool)>,
        bicliques: &Bicliques,
        overlaps: &OverlapMap,
        node_id: u64,
    ) -> Result<Self> {
        Self::build(node_to_biclique_edge, bicliques, overlaps, node_id, &|id| {
            child_to_parent.get(&id).map(|&(p, _)| p).unwrap_or(id)
        })
    }

    fn build(
        node_to_biclique_edge: &[Vec<BicliqueEdgeIndex>],
        bicliques: &Bicliques,
        overlaps: &OverlapMap,
        node_id: u64,
        resolve: &dyn Fn(u64) -> u64,
    ) -> Result<Self> {
        let mut factored_overlaps: [BTreeMap<usize, Vec<OverlapInfo>>; 2] =
            [BTreeMap::new(), BTreeMap::new()];

        for &index in &node_to_biclique_edge[node_id as usize] {
            let stored = bicliques.edge(index);
            let (edge, alignment) = overlaps.canonicalize_and_find(stored)?;
            let (left_len, right_len) = alignment.compute_lengths();

            let left_id = resolve(edge.0.id());
            let right_id = resolve(edge.1.id());

            // A node on the left of an edge overlaps on its 3' end when
            // forward, 5' when reversed; mirrored for the right endpoint.
            if left_id == node_id {
                let side = if edge.0.is_reverse() { 0 } else { 1 };
                factored_overlaps[side]
                    .entry(index.biclique_index)
                    .or_default()
                    .push(OverlapInfo {
                        edge_index: index.edge_index,
                        length: left_len,
                    });
            }
            if right_id == node_id {
                let side = if edge.1.is_reverse() { 1 } else { 0 };
                factored_overlaps[side]
                    .entry(index.biclique_index)
                    .or_default()
                    .push(OverlapInfo {
                        edge_index: index.edge_index,
                        length: right_len,
                    });
            }
            if left_id != node_id && right_id != node_id {
                return Err(BluntifyError::ParentNotFoundOnEdge {
                    parent: node_id,
                    from: edge.0.id(),
                    to: edge.1.id(),
                });
            }
        }

        for side in &mut factored_overlaps {
            for infos in side.values_mut() {
                infos.sort_by(|a, b| b.length.cmp(&a.length));
            }
        }

        Ok(NodeInfo {
            node_id,
            factored_overlaps,
        })
    }

    /// Per side: the distinct biclique extents in descending order, paired
    /// with the biclique achieving each. A biclique's extent is its longest
    /// overlap on that side.
    pub fn sorted_biclique_extents(&self) -> ([VecDeque<u64>; 2], [VecDeque<usize>; 2]) {
        let mut extents: [VecDeque<u64>; 2] = [VecDeque::new(), VecDeque::new()];
        let mut biclique_order: [VecDeque<usize>; 2] = [VecDeque::new(), VecDeque::new()];
        for side in 0..2 {
            let mut pairs: Vec<(usize, u64)> = self.factored_overlaps[side]
                .iter()
                .map(|(&biclique, infos)| (biclique, infos[0].length))
                .collect();
            pairs.sort_by(|a, b| b.1.cmp(&a.1));
            for (biclique, extent) in pairs {
                biclique_order[side].push_back(biclique);
                extents[side].push_back(extent);
            }
        }
        (extents, biclique_order)
    }
}
