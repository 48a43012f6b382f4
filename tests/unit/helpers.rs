//! Shared fixtures for the unit tests.

use bluntify::cigar::Alignment;
use bluntify::graph::{Edge, GraphView, Handle, HashGraph};
use bluntify::overlaps::OverlapMap;
use bluntify::pipeline::Bluntifier;

/// Assemble a GFA document from record lines.
pub fn gfa(lines: &[&str]) -> String {
    let mut text = String::from("H\tHVN:Z:1.0\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// A bipartite block fixture over single-base nodes: left nodes get ids
/// `1..=n_left`, right nodes follow. Every `(l, r)` pair becomes an edge with
/// a `1M` overlap; the returned side lists are what the cover machinery
/// consumes.
pub struct BipartiteFixture {
    pub graph: HashGraph,
    pub overlaps: OverlapMap,
    pub left: Vec<Handle>,
    pub right: Vec<Handle>,
}

pub fn bipartite(n_left: usize, n_right: usize, edges: &[(usize, usize)]) -> BipartiteFixture {
    let mut graph = HashGraph::new();
    let mut overlaps = OverlapMap::new();
    for _ in 0..n_left + n_right {
        graph.create_node(b"A".to_vec());
    }
    let left: Vec<Handle> = (1..=n_left as u64).map(Handle::forward).collect();
    let right: Vec<Handle> = (1..=n_right as u64)
        .map(|i| Handle::new(n_left as u64 + i, true))
        .collect();
    for &(l, r) in edges {
        let edge = Edge(left[l], right[r].flip());
        graph.create_edge(edge);
        overlaps.insert(edge, Alignment::parse("1M", 0).unwrap());
    }
    BipartiteFixture {
        graph,
        overlaps,
        left,
        right,
    }
}

/// Sorted sequences of every node in the final graph.
pub fn node_seqs(bluntifier: &Bluntifier) -> Vec<String> {
    let mut seqs = Vec::new();
    bluntifier.graph.for_each_handle(&mut |h| {
        seqs.push(String::from_utf8(bluntifier.graph.sequence(h)).unwrap());
    });
    seqs.sort();
    seqs
}

/// The forward handle of the unique node spelling `seq`.
pub fn node_with_seq(bluntifier: &Bluntifier, seq: &str) -> Handle {
    let mut found = Vec::new();
    bluntifier.graph.for_each_handle(&mut |h| {
        if bluntifier.graph.sequence(h) == seq.as_bytes() {
            found.push(h);
        }
    });
    assert_eq!(found.len(), 1, "expected exactly one node spelling {seq}");
    found[0]
}

pub fn has_edge(bluntifier: &Bluntifier, from: Handle, to: Handle) -> bool {
    bluntifier.graph.has_edge(from, to)
}

/// Check the sequence-preservation property: the provenance intervals of
/// `parent` tile its original sequence consistently and completely.
pub fn assert_reconstructs(bluntifier: &Bluntifier, parent_name: &str, original: &str) {
    let parent_id = bluntifier.id_map.get_id(parent_name).unwrap();
    let mut buf: Vec<Option<u8>> = vec![None; original.len()];
    for (child, infos) in &bluntifier.provenance {
        for info in infos {
            if info.parent != parent_id {
                continue;
            }
            // reading the child along its reversal flag yields the parent's
            // forward-strand interval
            let seq = bluntifier.graph.sequence(Handle::new(*child, info.reversal));
            assert_eq!(
                seq.len() as u64,
                info.stop - info.start + 1,
                "interval length mismatch for child {child} of {parent_name}"
            );
            for (k, &c) in seq.iter().enumerate() {
                let pos = info.start as usize + k;
                match buf[pos] {
                    None => buf[pos] = Some(c),
                    Some(prev) => assert_eq!(
                        prev, c,
                        "conflicting provenance at {parent_name}[{pos}]"
                    ),
                }
            }
        }
    }
    let rebuilt: String = buf
        .iter()
        .enumerate()
        .map(|(pos, o)| {
            o.unwrap_or_else(|| panic!("{parent_name}[{pos}] not covered by provenance")) as char
        })
        .collect();
    assert_eq!(rebuilt, original);
}

/// Count the edges of the final graph.
pub fn edge_count(bluntifier: &Bluntifier) -> usize {
    let mut n = 0;
    bluntifier.graph.for_each_edge(&mut |_| n += 1);
    n
}

/// All graph edges asserted reachable from one handle going right.
pub fn right_neighbors(bluntifier: &Bluntifier, handle: Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    bluntifier.graph.follow_edges(handle, false, &mut |h| {
        out.push(h);
        true
    });
    out.sort();
    out
}
