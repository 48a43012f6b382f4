//! Biclique cover of one bipartite block and the cover-wide bookkeeping
//! shared by the rest of the pipeline.

pub mod galois_tree;
pub mod lattice;
pub mod simplify;

use rustc_hash::FxHashSet;

use crate::bipartite::BipartiteGraph;
use crate::error::Result;
use crate::graph::{Edge, GraphView, Handle};
use crate::overlaps::OverlapMap;

use lattice::GaloisLattice;
use simplify::simplify;

/// `(L, R)` side sets of one biclique, sorted.
pub type Bipartition = (Vec<Handle>, Vec<Handle>);

/// Location of one edge inside the global biclique vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BicliqueEdgeIndex {
    pub biclique_index: usize,
    pub edge_index: usize,
}

/// All bicliques of the cover, stored as deduplicated edge lists.
#[derive(Debug, Default)]
pub struct Bicliques {
    pub bicliques: Vec<Vec<Edge>>,
}

impl Bicliques {
    pub fn len(&self) -> usize {
        self.bicliques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bicliques.is_empty()
    }

    pub fn edge(&self, index: BicliqueEdgeIndex) -> Edge {
        self.bicliques[index.biclique_index][index.edge_index]
    }

    pub fn edge_mut(&mut self, index: BicliqueEdgeIndex) -> &mut Edge {
        &mut self.bicliques[index.biclique_index][index.edge_index]
    }
}

impl std::ops::Index<usize> for Bicliques {
    type Output = Vec<Edge>;
    fn index(&self, i: usize) -> &Vec<Edge> {
        &self.bicliques[i]
    }
}

impl std::ops::IndexMut<usize> for Bicliques {
    fn index_mut(&mut self, i: usize) -> &mut Vec<Edge> {
        &mut self.bicliques[i]
    }
}

/// Exact covers are only attempted below this work bound.
const EXACT_COVER_WORK_LIMIT: usize = 65536;

/// Compute a biclique cover for one bipartite block. Small blocks get the
/// exact domino-free cover; everything else (including blocks that turn out
/// not to be domino-free) falls back to the greedy heuristic.
pub fn compute_cover(
    host: &dyn GraphView,
    overlaps: &OverlapMap,
    left: &[Handle],
    right: &[Handle],
) -> Vec<Bipartition> {
    let view = BipartiteGraph::new(host, overlaps, left, right);
    let edge_count = view.edge_count();
    if edge_count == 0 {
        return Vec::new();
    }
    if edge_count * (view.left_size() + view.right_size()) <= EXACT_COVER_WORK_LIMIT {
        let sub = simplify(host, overlaps, left, right);
        let simplified_view = BipartiteGraph::new(&sub, overlaps, left, right);
        if let Some(lattice) = GaloisLattice::new(&simplified_view) {
            let cover = lattice.biclique_cover();
            if !cover.is_empty() {
                return cover
                    .into_iter()
                    .map(|b| maximalize(&view, b))
                    .collect();
            }
        }
    }
    heuristic_cover(&view)
}

/// Expand a biclique found on the simplified graph to the maximal biclique
/// of the host containing it: `R* = ∩ Nbd(L)`, then
/// `L* = {u : Nbd(u) ⊇ R*}`.
fn maximalize(view: &BipartiteGraph, (left, _right): Bipartition) -> Bipartition {
    let mut common: Option<FxHashSet<Handle>> = None;
    for &l in &left {
        let nbd: FxHashSet<Handle> = view.adjacent_sides(l).into_iter().collect();
        common = Some(match common {
            None => nbd,
            Some(acc) => acc.intersection(&nbd).copied().collect(),
        });
    }
    let mut right_star: Vec<Handle> = common.unwrap_or_default().into_iter().collect();
    right_star.sort_unstable();
    let right_set: FxHashSet<Handle> = right_star.iter().copied().collect();
    let mut left_star: Vec<Handle> = view
        .left()
        .iter()
        .copied()
        .filter(|&u| {
            let nbd: FxHashSet<Handle> = view.adjacent_sides(u).into_iter().collect();
            right_set.iter().all(|r| nbd.contains(r))
        })
        .collect();
    left_star.sort_unstable();
    (left_star, right_star)
}

/// Greedy maximal-biclique extraction: take the first uncovered edge
/// `(l, r)`, emit the maximal biclique `({u : Nbd(u) ⊇ Nbd(l)}, Nbd(l))`,
/// and repeat until every edge is covered.
pub fn heuristic_cover(view: &BipartiteGraph) -> Vec<Bipartition> {
    let mut covered: FxHashSet<(Handle, Handle)> = FxHashSet::default();
    let mut cover = Vec::new();
    for &l in view.left() {
        let right = view.adjacent_sides(l);
        if right.iter().all(|&r| covered.contains(&(l, r))) {
            continue;
        }
        let right_set: FxHashSet<Handle> = right.iter().copied().collect();
        let left: Vec<Handle> = view
            .left()
            .iter()
            .copied()
            .filter(|&u| {
                let nbd: FxHashSet<Handle> = view.adjacent_sides(u).into_iter().collect();
                right_set.iter().all(|r| nbd.contains(r))
            })
            .collect();
        for &u in &left {
            for &r in &right {
                covered.insert((u, r));
            }
        }
        cover.push((left, right.clone()));
    }
    cover
}

/// Sort a cover descending by `|L|·|R|` (so larger blocks claim shared edges
/// first) and flatten it into canonicalized, deduplicated edge lists.
pub fn deduplicate_and_canonicalize(
    mut cover: Vec<Bipartition>,
    overlaps: &OverlapMap,
) -> Result<Vec<Vec<Edge>>> {
    cover.sort_by(|a, b| {
        (b.0.len() * b.1.len()).cmp(&(a.0.len() * a.1.len()))
    });
    let mut seen: FxHashSet<Edge> = FxHashSet::default();
    let mut out = Vec::new();
    for (left, right) in cover {
        let mut edges = Vec::new();
        for &l in &left {
            for &r in &right {
                let edge = Edge(l, r.flip());
                let (canonical, _) = overlaps.canonicalize_and_find(edge)?;
                if seen.insert(canonical) {
                    edges.push(canonical);
                }
            }
        }
        if !edges.is_empty() {
            out.push(edges);
        }
    }
    Ok(out)
}
