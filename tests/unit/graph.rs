//! Unit tests for the graph container.

use bluntify::graph::{Edge, GraphView, Handle, HashGraph};

fn neighbors(graph: &HashGraph, handle: Handle, go_left: bool) -> Vec<Handle> {
    let mut out = Vec::new();
    graph.follow_edges(handle, go_left, &mut |h| {
        out.push(h);
        true
    });
    out.sort();
    out
}

#[test]
fn handle_packing_roundtrip() {
    let h = Handle::new(42, true);
    assert_eq!(h.id(), 42);
    assert!(h.is_reverse());
    assert!(!h.flip().is_reverse());
    assert_eq!(h.flip().flip(), h);
}

#[test]
fn edge_canonical_is_involutive() {
    let e = Edge(Handle::new(3, true), Handle::new(1, false));
    assert_eq!(e.canonical(), e.flipped().canonical());
    assert_eq!(e.canonical().canonical(), e.canonical());
}

#[test]
fn edges_are_equivalent_under_flip() {
    let mut g = HashGraph::new();
    let a = g.create_node(b"ACGT".to_vec());
    let b = g.create_node(b"TTTT".to_vec());
    g.create_edge(Edge(a, b));
    assert!(g.has_edge(a, b));
    assert!(g.has_edge(b.flip(), a.flip()));
    assert_eq!(neighbors(&g, a, false), vec![b]);
    assert_eq!(neighbors(&g, b, true), vec![a]);
    assert_eq!(neighbors(&g, b.flip(), false), vec![a.flip()]);
    g.destroy_edge(Edge(b.flip(), a.flip()));
    assert!(!g.has_edge(a, b));
}

#[test]
fn sequences_follow_orientation() {
    let mut g = HashGraph::new();
    let a = g.create_node(b"AACG".to_vec());
    assert_eq!(g.sequence(a), b"AACG");
    assert_eq!(g.sequence(a.flip()), b"CGTT");
}

#[test]
fn split_moves_end_edges_and_rewrites_paths() {
    let mut g = HashGraph::new();
    let x = g.create_node(b"TT".to_vec());
    let n = g.create_node(b"ACGTACGT".to_vec());
    let y = g.create_node(b"GG".to_vec());
    g.create_edge(Edge(x, n));
    g.create_edge(Edge(n, y));
    g.create_path("p");
    g.append_step("p", n);

    let pieces = g.split_handle(n, &[4]);
    assert_eq!(pieces.len(), 2);
    assert_eq!(g.sequence(pieces[0]), b"ACGT");
    assert_eq!(g.sequence(pieces[1]), b"ACGT");
    assert!(g.has_edge(x, pieces[0]));
    assert!(g.has_edge(pieces[0], pieces[1]));
    assert!(g.has_edge(pieces[1], y));
    assert!(!g.has_node(n.id()));
    assert_eq!(g.path_steps("p").unwrap(), &pieces[..]);
}

#[test]
fn split_reverse_handle_mirrors_offsets() {
    let mut g = HashGraph::new();
    let n = g.create_node(b"AACCGG".to_vec());
    let pieces = g.split_handle(n.flip(), &[2]);
    // pieces run along the reverse strand: first spells the reverse prefix
    assert_eq!(g.sequence(pieces[0]), b"CC");
    assert_eq!(g.sequence(pieces[1]), b"GGTT");
}

#[test]
fn split_preserves_self_loop() {
    let mut g = HashGraph::new();
    let n = g.create_node(b"CATCAT".to_vec());
    g.create_edge(Edge(n, n));
    let pieces = g.split_handle(n, &[3]);
    // the loop now runs from the forward end back into the forward start
    assert!(g.has_edge(pieces[1], pieces[0]));
}

#[test]
fn split_preserves_reversing_self_loop() {
    let mut g = HashGraph::new();
    let n = g.create_node(b"CATCAT".to_vec());
    g.create_edge(Edge(n, n.flip()));
    let pieces = g.split_handle(n, &[3]);
    assert!(g.has_edge(pieces[1], pieces[1].flip()));
}

#[test]
fn copy_into_shifts_ids_and_paths() {
    let mut src = HashGraph::new();
    let a = src.create_node(b"AC".to_vec());
    let b = src.create_node(b"GT".to_vec());
    src.create_edge(Edge(a, b));
    src.create_path("q");
    src.append_step("q", a);
    src.append_step("q", b);

    let mut dst = HashGraph::new();
    dst.create_node(b"AAAA".to_vec());
    let offset = src.copy_into(&mut dst);
    assert_eq!(offset, 1);
    assert_eq!(dst.node_count(), 3);
    assert!(dst.has_edge(Handle::forward(a.id() + 1), Handle::forward(b.id() + 1)));
    let steps = dst.path_steps("q").unwrap();
    assert_eq!(steps[0].id(), a.id() + 1);
}

#[test]
fn destroy_handle_drops_edges_and_paths() {
    let mut g = HashGraph::new();
    let a = g.create_node(b"AC".to_vec());
    let b = g.create_node(b"GT".to_vec());
    g.create_edge(Edge(a, b));
    g.create_path("p");
    g.append_step("p", a);
    g.append_step("p", b);
    g.destroy_handle(b.id());
    assert!(!g.has_node(b.id()));
    assert!(neighbors(&g, a, false).is_empty());
    assert!(g.path_steps("p").is_none());
}

#[test]
fn for_each_edge_visits_each_link_once() {
    let mut g = HashGraph::new();
    let a = g.create_node(b"A".to_vec());
    let b = g.create_node(b"C".to_vec());
    let c = g.create_node(b"G".to_vec());
    g.create_edge(Edge(a, b));
    g.create_edge(Edge(a.flip(), c));
    g.create_edge(Edge(b, b.flip()));
    let mut edges = Vec::new();
    g.for_each_edge(&mut |e| edges.push(e));
    assert_eq!(edges.len(), 3);
    let mut dedup = edges.clone();
    dedup.sort();
    dedup.dedup();
    assert_eq!(dedup.len(), 3);
}
