//! Centered Galois tree (Amilhastre et al. 1998).
//!
//! For one left-side center, partitions the 2-hop neighborhood into
//! equivalence classes of identical right-neighborhoods and links them by
//! immediate containment. In a domino-free graph the containment relation
//! forms a tree rooted at the central class (the one with the largest
//! neighborhood); any branching or containment violation means the graph is
//! not domino-free when seen from this center.

use rustc_hash::FxHashMap;

use crate::bipartite::BipartiteGraph;
use crate::error::{BluntifyError, Result};
use crate::graph::Handle;

#[derive(Debug)]
pub struct CenteredGaloisTree {
    /// Left-side members of each equivalence class.
    equiv_classes: Vec<Vec<Handle>>,
    /// Common right-side neighborhood of each class.
    neighborhoods: Vec<Vec<Handle>>,
    /// Immediate successor in the containment order.
    successors: Vec<Option<usize>>,
    /// Immediate predecessors in the containment order.
    predecessors: Vec<Vec<usize>>,
}

impl CenteredGaloisTree {
    /// Build the tree around `center`. Fails with
    /// [`BluntifyError::InconsistentSuccessor`] when the neighborhood
    /// ordering property does not hold from this center.
    pub fn new(graph: &BipartiteGraph, center: Handle) -> Result<Self> {
        // Two-hop subgraph: the rights seen from the center, then the lefts
        // seen from those rights. Rightward edges are restricted to the
        // collected right set since lefts can reach outside it.
        let mut right_nodes: Vec<Handle> = Vec::new();
        let mut left_nodes: Vec<Handle> = Vec::new();
        let mut left_idx: FxHashMap<Handle, usize> = FxHashMap::default();
        let mut left_edges: Vec<Vec<usize>> = Vec::new();
        {
            let mut center_rights = Vec::new();
            graph.for_each_adjacent_side(center, &mut |r| {
                center_rights.push(r);
                true
            });
            for right in center_rights {
                let right_index = right_nodes.len();
                graph.for_each_adjacent_side(right, &mut |left| {
                    match left_idx.get(&left) {
                        None => {
                            left_idx.insert(left, left_edges.len());
                            left_edges.push(vec![right_index]);
                            left_nodes.push(left);
                        }
                        Some(&i) => left_edges[i].push(right_index),
                    }
                    true
                });
                right_nodes.push(right);
            }
        }

        // Iterated refinement: everything starts in one class; each right
        // node splits every class it touches into touched vs. untouched.
        let mut assignment = vec![usize::MAX; left_nodes.len()];
        let mut next_class = 0usize;
        for right_index in 0..right_nodes.len() {
            let mut refined: FxHashMap<usize, usize> = FxHashMap::default();
            let mut touched_lefts = Vec::new();
            graph.for_each_adjacent_side(right_nodes[right_index], &mut |left| {
                touched_lefts.push(left);
                true
            });
            for left in touched_lefts {
                let Some(&li) = left_idx.get(&left) else {
                    continue;
                };
                let class = assignment[li];
                match refined.get(&class) {
                    Some(&new_class) => assignment[li] = new_class,
                    None => {
                        refined.insert(class, next_class);
                        assignment[li] = next_class;
                        next_class += 1;
                    }
                }
            }
        }

        // Compact class ids in first-seen order and record neighborhoods.
        let mut compacted: FxHashMap<usize, usize> = FxHashMap::default();
        let mut equiv_classes: Vec<Vec<Handle>> = Vec::new();
        let mut class_edges: Vec<Vec<usize>> = Vec::new();
        let mut neighborhoods: Vec<Vec<Handle>> = Vec::new();
        for i in 0..left_nodes.len() {
            let class = match compacted.get(&assignment[i]) {
                Some(&c) => c,
                None => {
                    let c = equiv_classes.len();
                    compacted.insert(assignment[i], c);
                    equiv_classes.push(Vec::new());
                    // edge lists were built in ascending right-index order
                    neighborhoods.push(left_edges[i].iter().map(|&j| right_nodes[j]).collect());
                    class_edges.push(std::mem::take(&mut left_edges[i]));
                    c
                }
            };
            equiv_classes[class].push(left_nodes[i]);
        }

        // Bucket classes by neighborhood size, then list, for each right
        // node, its incident classes in ascending degree order.
        let mut degree_groups: Vec<Vec<usize>> = vec![Vec::new(); right_nodes.len() + 1];
        for (class, nbd) in neighborhoods.iter().enumerate() {
            degree_groups[nbd.len()].push(class);
        }
        let mut degree_ordered: Vec<Vec<usize>> = vec![Vec::new(); right_nodes.len()];
        for group in &degree_groups {
            for &class in group {
                for &right_index in &class_edges[class] {
                    degree_ordered[right_index].push(class);
                }
            }
        }

        // Each consecutive pair in a degree-ordered incidence list asserts an
        // immediate successor; a second, different assertion for the same
        // class breaks the tree.
        let mut successors: Vec<Option<usize>> = vec![None; equiv_classes.len()];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); equiv_classes.len()];
        for list in &degree_ordered {
            if list.is_empty() {
                continue;
            }
            let mut pred = list[0];
            for &succ in &list[1..] {
                match successors[pred] {
                    None => {
                        successors[pred] = Some(succ);
                        predecessors[succ].push(pred);
                    }
                    Some(existing) if existing != succ => {
                        return Err(BluntifyError::InconsistentSuccessor);
                    }
                    Some(_) => {}
                }
                pred = succ;
            }
        }

        // Verify the containment relation by a linear merge over the sorted
        // edge lists.
        for (class, nbd) in class_edges.iter().enumerate() {
            for &pred in &predecessors[class] {
                let pred_nbd = &class_edges[pred];
                let mut p = 0;
                for &s in nbd {
                    if p < pred_nbd.len() && s == pred_nbd[p] {
                        p += 1;
                    }
                }
                if p < pred_nbd.len() {
                    return Err(BluntifyError::InconsistentSuccessor);
                }
            }
        }

        Ok(CenteredGaloisTree {
            equiv_classes,
            neighborhoods,
            successors,
            predecessors,
        })
    }

    pub fn size(&self) -> usize {
        self.equiv_classes.len()
    }

    pub fn predecessors(&self, class: usize) -> &[usize] {
        &self.predecessors[class]
    }

    pub fn successor(&self, class: usize) -> Option<usize> {
        self.successors[class]
    }

    /// The class with no successor, reached by following successor links.
    pub fn central_equivalence_class(&self) -> usize {
        let mut i = 0;
        while let Some(next) = self.successors[i] {
            i = next;
        }
        i
    }

    pub fn right_size(&self, class: usize) -> usize {
        self.neighborhoods[class].len()
    }

    /// Lazy cross product of the class members and their neighborhood.
    pub fn edges(&self, class: usize) -> impl Iterator<Item = (Handle, Handle)> + '_ {
        self.equiv_classes[class].iter().flat_map(move |&l| {
            self.neighborhoods[class].iter().map(move |&r| (l, r))
        })
    }

    pub fn first_edge(&self, class: usize) -> (Handle, Handle) {
        (
            self.equiv_classes[class][0],
            self.neighborhoods[class][0],
        )
    }

    /// The maximal biclique of this class: its neighborhood on the right,
    /// and on the left the union of all classes up the successor chain.
    pub fn biclique(&self, class: usize) -> (Vec<Handle>, Vec<Handle>) {
        let mut left = Vec::new();
        let mut i = Some(class);
        while let Some(c) = i {
            left.extend_from_slice(&self.equiv_classes[c]);
            i = self.successors[c];
        }
        left.sort_unstable();
        let mut right = self.neighborhoods[class].clone();
        right.sort_unstable();
        (left, right)
    }

    /// Left-side members of one class.
    pub fn members(&self, class: usize) -> &[Handle] {
        &self.equiv_classes[class]
    }
}
