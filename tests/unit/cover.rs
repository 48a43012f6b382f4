//! Unit tests for the cover driver: exact-vs-heuristic policy, simplification
//! closure, and deduplication.

use bluntify::biclique::{compute_cover, deduplicate_and_canonicalize};
use bluntify::graph::{Edge, GraphView};
use rustc_hash::FxHashSet;

use super::helpers::bipartite;

#[test]
fn complete_block_needs_one_biclique() {
    let fx = bipartite(2, 2, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
    let cover = compute_cover(&fx.graph, &fx.overlaps, &fx.left, &fx.right);
    assert_eq!(cover.len(), 1);
    assert_eq!(cover[0].0.len(), 2);
    assert_eq!(cover[0].1.len(), 2);
}

#[test]
fn dominated_nodes_are_restored_by_maximalization() {
    // Nbd(a) = {x, y} dominates Nbd(b) = {y}; simplification strips the
    // shared edge off `a`, and the cover still covers it.
    let fx = bipartite(2, 2, &[(0, 0), (0, 1), (1, 1)]);
    let cover = compute_cover(&fx.graph, &fx.overlaps, &fx.left, &fx.right);
    assert_eq!(cover.len(), 2);
    let mut covered: FxHashSet<Edge> = FxHashSet::default();
    for (left, right) in &cover {
        for &l in left {
            for &r in right {
                assert!(fx.graph.has_edge(l, r.flip()));
                covered.insert(Edge(l, r.flip()).canonical());
            }
        }
    }
    assert_eq!(covered.len(), 3);
}

#[test]
fn crown_falls_back_to_heuristic_and_still_covers() {
    let mut edges = Vec::new();
    for l in 0..4 {
        for r in 0..4 {
            if l != r {
                edges.push((l, r));
            }
        }
    }
    let fx = bipartite(4, 4, &edges);
    let cover = compute_cover(&fx.graph, &fx.overlaps, &fx.left, &fx.right);
    assert!(!cover.is_empty());
    let mut covered: FxHashSet<Edge> = FxHashSet::default();
    for (left, right) in &cover {
        for &l in left {
            for &r in right {
                assert!(fx.graph.has_edge(l, r.flip()));
                covered.insert(Edge(l, r.flip()).canonical());
            }
        }
    }
    assert_eq!(covered.len(), 12);
}

#[test]
fn deduplication_assigns_each_edge_to_exactly_one_biclique() {
    // a-x, a-y, b-y: the two maximal bicliques share the edge a-y
    let fx = bipartite(2, 2, &[(0, 0), (0, 1), (1, 1)]);
    let cover = compute_cover(&fx.graph, &fx.overlaps, &fx.left, &fx.right);
    let deduplicated = deduplicate_and_canonicalize(cover, &fx.overlaps).unwrap();
    let mut seen: FxHashSet<Edge> = FxHashSet::default();
    let mut total = 0;
    for biclique in &deduplicated {
        for &edge in biclique {
            assert!(seen.insert(edge), "edge {edge} appears twice");
            total += 1;
        }
    }
    assert_eq!(total, 3);
    // larger biclique first, so it claimed the shared edge
    assert!(deduplicated[0].len() >= deduplicated[1].len());
}
