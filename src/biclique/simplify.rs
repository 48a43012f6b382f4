//! Cover-preserving simplification (Amilhastre et al. 1998, algorithm 2).
//!
//! Whenever `Nbd(u) ⊆ Nbd(v)` within one partition, the edges `v` shares
//! with `u`'s neighbors are removed from `v`. Removals happen in a
//! subtractive overlay, so the host graph keeps every edge; the simplified
//! graph has the same minimum biclique cover once the cover's bicliques are
//! re-maximalized against the host.

use rustc_hash::FxHashSet;

use crate::bipartite::SubtractiveGraph;
use crate::graph::{GraphView, Handle};
use crate::overlaps::OverlapMap;

/// Simplify both partitions of one bipartite block over `host`, returning
/// the overlay with the dominated edges suppressed.
pub fn simplify<'a>(
    host: &'a dyn GraphView,
    overlaps: &OverlapMap,
    left: &[Handle],
    right: &[Handle],
) -> SubtractiveGraph<'a> {
    let mut sub = SubtractiveGraph::new(host);
    let left_set: FxHashSet<Handle> = left.iter().copied().collect();
    let right_set: FxHashSet<Handle> = right.iter().copied().collect();
    simplify_side(left, &right_set, overlaps, &mut sub);
    simplify_side(right, &left_set, overlaps, &mut sub);
    sub
}

fn adjacent_in(
    sub: &SubtractiveGraph,
    overlaps: &OverlapMap,
    side: Handle,
    opposite: &FxHashSet<Handle>,
) -> Vec<Handle> {
    let mut out = Vec::new();
    crate::adjacency::for_each_adjacent_side(sub, overlaps, side, &mut |s| {
        if opposite.contains(&s) {
            out.push(s);
        }
        true
    });
    out.sort_unstable();
    out.dedup();
    out
}

fn simplify_side(
    partition: &[Handle],
    opposite: &FxHashSet<Handle>,
    overlaps: &OverlapMap,
    sub: &mut SubtractiveGraph,
) {
    let n = partition.len();
    let partition_set: FxHashSet<Handle> = partition.iter().copied().collect();
    // LI in Amilhastre: nodes that currently have a successor
    let mut nonmaximal = vec![false; n];
    // successor[u][v]: Nbd(u) ⊆ Nbd(v)
    let mut successor = vec![vec![false; n]; n];
    let mut num_successors = vec![0usize; n];
    let mut degree = vec![0usize; n];
    // Delta(u, v) = |Nbd(u) \ Nbd(v)|
    let mut delta = vec![vec![0i64; n]; n];

    let neighborhoods: Vec<FxHashSet<Handle>> = partition
        .iter()
        .map(|&h| adjacent_in(sub, overlaps, h, opposite).into_iter().collect())
        .collect();
    for i in 0..n {
        degree[i] = neighborhoods[i].len();
        for j in 0..n {
            if i == j {
                continue;
            }
            let shared = neighborhoods[i]
                .iter()
                .filter(|h| neighborhoods[j].contains(*h))
                .count() as i64;
            delta[i][j] = degree[i] as i64 - shared;
            if delta[i][j] == 0 && degree[i] > 0 {
                successor[i][j] = true;
                nonmaximal[i] = true;
                num_successors[i] += 1;
            }
        }
    }

    loop {
        let Some(i) = (0..n).find(|&i| nonmaximal[i]) else {
            break;
        };
        for j in 0..n {
            if !successor[i][j] {
                continue;
            }
            // remove from j the edges it shares with i's neighbors
            let shared = adjacent_in(sub, overlaps, partition[i], opposite);
            for nbr in shared {
                if !sub.has_edge(partition[j], nbr.flip()) {
                    continue;
                }
                sub.subtract_edge(partition[j], nbr.flip());
                degree[j] -= 1;

                let nbr_nbrs: FxHashSet<Handle> =
                    adjacent_in(sub, overlaps, nbr, &partition_set)
                        .into_iter()
                        .collect();
                for k in 0..n {
                    if k == j {
                        continue;
                    }
                    if nbr_nbrs.contains(&partition[k]) {
                        // nbr is now in Nbd(k) \ Nbd(j)
                        delta[k][j] += 1;
                        if nonmaximal[k] && successor[k][j] {
                            successor[k][j] = false;
                            num_successors[k] -= 1;
                            if num_successors[k] == 0 {
                                nonmaximal[k] = false;
                            }
                        }
                    } else {
                        // nbr left Nbd(j) \ Nbd(k)
                        delta[j][k] -= 1;
                    }
                    if delta[j][k] == 0 && degree[j] > 0 && !successor[j][k] {
                        successor[j][k] = true;
                        num_successors[j] += 1;
                        nonmaximal[j] = true;
                    }
                }
            }
        }
        for j in 0..n {
            if successor[i][j] {
                successor[i][j] = false;
                num_successors[i] -= 1;
            }
        }
        nonmaximal[i] = false;
    }
}
