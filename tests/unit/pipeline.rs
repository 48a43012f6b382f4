//! End-to-end tests over the seed scenarios.

use bluntify::graph::{GraphView, Handle};
use bluntify::pipeline::bluntify_gfa_text;

use super::helpers::{
    assert_reconstructs, edge_count, gfa, has_edge, node_seqs, node_with_seq, right_neighbors,
};

#[test]
fn simple_two_node_overlap() {
    let input = gfa(&[
        "S\tA\tACGTACGT",
        "S\tB\tACGTGGGG",
        "L\tA\t+\tB\t+\t4M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(node_seqs(&b), vec!["ACGT", "ACGT", "GGGG"]);
    // A' -> shared -> B'
    let b_rest = node_with_seq(&b, "GGGG");
    let shared = {
        let mut into_b = Vec::new();
        b.graph.follow_edges(b_rest, true, &mut |h| {
            into_b.push(h);
            true
        });
        assert_eq!(into_b.len(), 1);
        into_b[0]
    };
    assert_eq!(b.graph.sequence(shared), b"ACGT");
    assert_eq!(right_neighbors(&b, shared), vec![b_rest]);
    assert_reconstructs(&b, "A", "ACGTACGT");
    assert_reconstructs(&b, "B", "ACGTGGGG");
}

#[test]
fn fork_shares_one_suffix_node() {
    let input = gfa(&[
        "S\tA\tAAATTT",
        "S\tB\tTTTGGG",
        "S\tC\tTTTCCC",
        "L\tA\t+\tB\t+\t3M",
        "L\tA\t+\tC\t+\t3M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(node_seqs(&b), vec!["AAA", "CCC", "GGG", "TTT"]);
    let shared = node_with_seq(&b, "TTT");
    let a_rest = node_with_seq(&b, "AAA");
    assert!(has_edge(&b, a_rest, shared));
    let downstream = right_neighbors(&b, shared);
    assert_eq!(downstream.len(), 2);
    assert_reconstructs(&b, "A", "AAATTT");
    assert_reconstructs(&b, "B", "TTTGGG");
    assert_reconstructs(&b, "C", "TTTCCC");
}

#[test]
fn exact_self_loop_becomes_two_node_cycle() {
    // the 2-base prefix and suffix of A are both CA; the loop collapses to
    // a cycle where the shared CA is represented once
    let input = gfa(&["S\tA\tCATCCA", "L\tA\t+\tA\t+\t2M"]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(node_seqs(&b), vec!["CA", "TC"]);
    let shared = node_with_seq(&b, "CA");
    let mid = node_with_seq(&b, "TC");
    assert!(has_edge(&b, mid, shared));
    assert!(has_edge(&b, shared, mid));
    assert_eq!(edge_count(&b), 2);
    assert_reconstructs(&b, "A", "CATCCA");
}

#[test]
fn non_domino_free_component_uses_heuristic_cover() {
    // crown: every left overlaps every right except its twin, all by AA
    let input = gfa(&[
        "S\tL1\tGGAA",
        "S\tL2\tCCAA",
        "S\tL3\tTTAA",
        "S\tL4\tGCAA",
        "S\tR1\tAACC",
        "S\tR2\tAAGG",
        "S\tR3\tAATT",
        "S\tR4\tAAGC",
        "L\tL1\t+\tR2\t+\t2M",
        "L\tL1\t+\tR3\t+\t2M",
        "L\tL1\t+\tR4\t+\t2M",
        "L\tL2\t+\tR1\t+\t2M",
        "L\tL2\t+\tR3\t+\t2M",
        "L\tL2\t+\tR4\t+\t2M",
        "L\tL3\t+\tR1\t+\t2M",
        "L\tL3\t+\tR2\t+\t2M",
        "L\tL3\t+\tR4\t+\t2M",
        "L\tL4\t+\tR1\t+\t2M",
        "L\tL4\t+\tR2\t+\t2M",
        "L\tL4\t+\tR3\t+\t2M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    for (name, seq) in [
        ("L1", "GGAA"),
        ("L2", "CCAA"),
        ("L3", "TTAA"),
        ("L4", "GCAA"),
        ("R1", "AACC"),
        ("R2", "AAGG"),
        ("R3", "AATT"),
        ("R4", "AAGC"),
    ] {
        assert_reconstructs(&b, name, seq);
    }
}

#[test]
fn overlapping_overlaps_share_the_interior_once() {
    // A's 5' and 3' overlaps of length 4 intersect in its middle AA
    let input = gfa(&[
        "S\tX\tTTAAAA",
        "S\tA\tAAAAAA",
        "S\tY\tAAAACC",
        "L\tX\t+\tA\t+\t4M",
        "L\tA\t+\tY\t+\t4M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    let seqs = node_seqs(&b);
    assert_eq!(seqs.iter().filter(|s| s.as_str() == "AA").count(), 1);
    let interior = node_with_seq(&b, "AA");
    let y_rest = node_with_seq(&b, "CC");
    // the stitched continuation out of A's interior
    assert!(has_edge(&b, interior, y_rest));
    assert_reconstructs(&b, "A", "AAAAAA");
    assert_reconstructs(&b, "X", "TTAAAA");
    assert_reconstructs(&b, "Y", "AAAACC");
}

#[test]
fn reversing_self_loop_collapses_palindromic_overlap() {
    // A+ -> A-: both junctions sit on A's 3' end and the 2-base overlap is
    // its own reverse complement
    let input = gfa(&["S\tA\tACGAT", "L\tA\t+\tA\t-\t2M"]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(node_seqs(&b), vec!["ACG", "AT"]);
    let mid = node_with_seq(&b, "ACG");
    let shared = node_with_seq(&b, "AT");
    assert!(has_edge(&b, mid, shared));
    assert!(has_edge(&b, shared, mid.flip()));
    assert_reconstructs(&b, "A", "ACGAT");
}

#[test]
fn zero_overlap_passes_through() {
    let input = gfa(&[
        "S\tA\tAAAA",
        "S\tB\tCCCC",
        "L\tA\t+\tB\t+\t0M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(b.graph.node_count(), 2);
    assert_eq!(node_seqs(&b), vec!["AAAA", "CCCC"]);
    assert!(has_edge(&b, Handle::forward(1), Handle::forward(2)));
    assert_eq!(edge_count(&b), 1);
}

#[test]
fn reverse_strand_overlap_is_blunted() {
    // A's suffix AACC matches the reverse strand prefix of B
    let input = gfa(&[
        "S\tA\tTTAACC",
        "S\tB\tCCGGTT",
        "L\tA\t+\tB\t-\t4M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(node_seqs(&b), vec!["AACC", "CC", "TT"]);
    let a_rest = node_with_seq(&b, "TT");
    let shared = node_with_seq(&b, "AACC");
    let b_rest = node_with_seq(&b, "CC");
    assert!(has_edge(&b, a_rest, shared));
    assert!(has_edge(&b, shared, b_rest.flip()));
    assert_reconstructs(&b, "A", "TTAACC");
    assert_reconstructs(&b, "B", "CCGGTT");
}

#[test]
fn fully_consumed_node_is_kept_whole_and_stitched() {
    // A is entirely one overlap; it cannot be carved, so the stitch wires it
    // straight into B's remainder
    let input = gfa(&[
        "S\tA\tACGT",
        "S\tB\tACGTGG",
        "L\tA\t+\tB\t+\t4M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    assert_eq!(node_seqs(&b), vec!["ACGT", "ACGT", "GG"]);
    let b_rest = node_with_seq(&b, "GG");
    assert!(has_edge(&b, Handle::forward(1), b_rest));
    assert_reconstructs(&b, "A", "ACGT");
    assert_reconstructs(&b, "B", "ACGTGG");
}

#[test]
fn exactly_tiling_overlaps_chain_through_the_stitch() {
    // B is tiled completely by its two touching overlaps
    let input = gfa(&[
        "S\tA\tGGAA",
        "S\tB\tAACC",
        "S\tC\tCCTT",
        "L\tA\t+\tB\t+\t2M",
        "L\tB\t+\tC\t+\t2M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    let a_rest = node_with_seq(&b, "GG");
    let shared_aa = node_with_seq(&b, "AA");
    let c_rest = node_with_seq(&b, "TT");
    assert!(has_edge(&b, a_rest, shared_aa));
    // A -> B -> C is spelled GG AA CC TT through the stitched chain
    let mid = right_neighbors(&b, shared_aa);
    assert_eq!(mid.len(), 1);
    assert_eq!(b.graph.sequence(mid[0]), b"CC");
    assert!(right_neighbors(&b, mid[0]).contains(&c_rest));
    assert_reconstructs(&b, "A", "GGAA");
    assert_reconstructs(&b, "B", "AACC");
    assert_reconstructs(&b, "C", "CCTT");
}

#[test]
fn blunt_output_has_zero_overlap_links() {
    let input = gfa(&[
        "S\tA\tAAATTT",
        "S\tB\tTTTGGG",
        "S\tC\tTTTCCC",
        "L\tA\t+\tB\t+\t3M",
        "L\tA\t+\tC\t+\t3M",
    ]);
    let b = bluntify_gfa_text(&input, 0, false).unwrap();
    let mut out = Vec::new();
    b.write_gfa(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    for line in text.lines() {
        if line.starts_with('L') {
            assert!(line.ends_with("\t0M"));
        }
    }
    let mut prov = Vec::new();
    b.write_provenance(&mut prov).unwrap();
    assert!(!prov.is_empty());
}
