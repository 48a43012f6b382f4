//! Unit tests for terminus duplication.

use bluntify::duplicate::{duplicate_prefix, duplicate_suffix};
use bluntify::graph::{Edge, GraphView, HashGraph};

#[test]
fn prefix_staircase_has_one_child_per_extent() {
    let mut g = HashGraph::new();
    let x = g.create_node(b"TT".to_vec());
    let n = g.create_node(b"ACGTACGT".to_vec());
    g.create_edge(Edge(n, x));
    g.create_path("1");
    g.append_step("1", n);

    let children = duplicate_prefix(&mut g, &[4, 2], n);
    assert_eq!(children.len(), 3);
    let rest = children[0];
    assert_eq!(g.sequence(rest), b"ACGT");
    assert_eq!(g.sequence(children[1]), b"ACGT");
    assert_eq!(g.sequence(children[2]), b"AC");
    // the carved prefix and every duplicate feed into the remainder
    assert!(g.has_edge(children[1], rest));
    assert!(g.has_edge(children[2], rest));
    // non-participating edges on the far side stay with the remainder
    assert!(g.has_edge(rest, x));
    // path identity is preserved through the split
    let steps = g.path_steps("1").unwrap().to_vec();
    assert_eq!(steps, vec![children[1], rest]);
}

#[test]
fn suffix_staircase_mirrors_the_prefix_case() {
    let mut g = HashGraph::new();
    let n = g.create_node(b"AACCGGTT".to_vec());
    g.create_path("1");
    g.append_step("1", n);

    let children = duplicate_suffix(&mut g, &[4, 3], n);
    assert_eq!(children.len(), 3);
    let rest = children[0];
    assert_eq!(g.sequence(rest), b"AACC");
    assert_eq!(g.sequence(children[1]), b"GGTT");
    assert_eq!(g.sequence(children[2]), b"GTT");
    assert!(g.has_edge(rest, children[1]));
    assert!(g.has_edge(rest, children[2]));
    let steps = g.path_steps("1").unwrap().to_vec();
    assert_eq!(steps, vec![rest, children[1]]);
}
