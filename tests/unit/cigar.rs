//! Unit tests for overlap CIGAR parsing.

use bluntify::cigar::Alignment;

#[test]
fn star_and_empty_parse_as_zero_length() {
    assert_eq!(Alignment::parse("*", 1).unwrap().compute_lengths(), (0, 0));
    assert_eq!(Alignment::parse("", 1).unwrap().compute_lengths(), (0, 0));
    assert!(Alignment::parse("*", 1).unwrap().is_empty());
}

#[test]
fn consumed_lengths_split_by_operation() {
    let aln = Alignment::parse("4M2D3I1X", 1).unwrap();
    assert_eq!(aln.compute_lengths(), (4 + 2 + 1, 4 + 3 + 1));
    let aln = Alignment::parse("10=", 1).unwrap();
    assert_eq!(aln.compute_lengths(), (10, 10));
}

#[test]
fn malformed_cigars_are_rejected() {
    assert!(Alignment::parse("M4", 7).is_err());
    assert!(Alignment::parse("4S", 7).is_err());
    assert!(Alignment::parse("12", 7).is_err());
}
