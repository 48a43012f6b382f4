//! Unit tests for adjacency components and bipartite decomposition.

use bluntify::adjacency::compute_all_adjacency_components;
use bluntify::cigar::Alignment;
use bluntify::gfa::{read_gfa, IdMap};
use bluntify::graph::{Edge, GraphView, Handle, HashGraph};
use bluntify::overlaps::OverlapMap;

use super::helpers::gfa;

fn load(lines: &[&str]) -> (HashGraph, IdMap, OverlapMap) {
    let text = gfa(lines);
    let mut graph = HashGraph::new();
    let mut id_map = IdMap::new();
    let mut overlaps = OverlapMap::new();
    read_gfa(text.as_bytes(), &mut graph, &mut id_map, &mut overlaps).unwrap();
    (graph, id_map, overlaps)
}

#[test]
fn one_edge_makes_one_component_of_two_sides() {
    let (graph, _ids, overlaps) = load(&[
        "S\tA\tACGTACGT",
        "S\tB\tACGTGGGG",
        "L\tA\t+\tB\t+\t4M",
    ]);
    let components = compute_all_adjacency_components(&graph, &overlaps);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].size(), 2);
    assert!(components[0].sides.contains(&Handle::forward(1)));
    assert!(components[0].sides.contains(&Handle::new(2, true)));
}

#[test]
fn zero_overlaps_are_excluded_from_adjacency() {
    let (graph, _ids, overlaps) = load(&[
        "S\tA\tAAAA",
        "S\tB\tCCCC",
        "L\tA\t+\tB\t+\t0M",
    ]);
    assert!(compute_all_adjacency_components(&graph, &overlaps).is_empty());
}

#[test]
fn fork_shares_one_junction() {
    let (graph, _ids, overlaps) = load(&[
        "S\tA\tAAATTT",
        "S\tB\tTTTGGG",
        "S\tC\tTTTCCC",
        "L\tA\t+\tB\t+\t3M",
        "L\tA\t+\tC\t+\t3M",
    ]);
    let components = compute_all_adjacency_components(&graph, &overlaps);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].size(), 3);
    let mut blocks = Vec::new();
    components[0]
        .decompose_into_bipartite_blocks(&graph, &overlaps, &mut |left, right| {
            blocks.push((left.to_vec(), right.to_vec()));
            Ok(())
        })
        .unwrap();
    assert_eq!(blocks.len(), 1);
    let (left, right) = &blocks[0];
    assert_eq!(left.len() + right.len(), 3);
    assert_eq!(left.len().min(right.len()), 1);
}

#[test]
fn odd_cycle_splits_into_singleton_blocks() {
    // sides A+, B-, C+ form a 3-cycle: A+ -> B+, C+ -> B+, C+ -> A-
    let mut graph = HashGraph::new();
    let mut overlaps = OverlapMap::new();
    let a = graph.create_node(b"AAAA".to_vec());
    let b = graph.create_node(b"AAAA".to_vec());
    let c = graph.create_node(b"AAAA".to_vec());
    for edge in [Edge(a, b), Edge(c, b), Edge(c, a.flip())] {
        graph.create_edge(edge);
        overlaps.insert(edge, Alignment::parse("2M", 0).unwrap());
    }
    let components = compute_all_adjacency_components(&graph, &overlaps);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].size(), 3);

    let mut blocks = Vec::new();
    components[0]
        .decompose_into_bipartite_blocks(&graph, &overlaps, &mut |left, right| {
            blocks.push((left.to_vec(), right.to_vec()));
            Ok(())
        })
        .unwrap();
    // one 2-colorable block plus one singleton for the odd edge
    assert_eq!(blocks.len(), 2);
    let singletons = blocks
        .iter()
        .filter(|(l, r)| l.len() == 1 && r.len() == 1)
        .count();
    assert!(singletons >= 1);
    // every adjacency is covered by exactly one block
    let mut covered = 0;
    for (left, right) in &blocks {
        for &l in left {
            for &r in right {
                if graph.has_edge(l, r.flip()) {
                    covered += 1;
                }
            }
        }
    }
    assert_eq!(covered, 3);
}
