//! Overlap CIGARs.
//!
//! GFA link lines describe how the source segment's end aligns against the
//! sink segment's start. Only the consumed lengths matter for blunting: `M`,
//! `=` and `X` consume both sides, `D` consumes the source, `I` the sink.

use crate::error::{BluntifyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Match,
    Mismatch,
    Equal,
    Insertion,
    Deletion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    operations: Vec<(u64, CigarOp)>,
}

impl Alignment {
    /// Parse a GFA overlap CIGAR. `*` and the empty string are zero-length
    /// overlaps.
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let mut operations = Vec::new();
        if text.is_empty() || text == "*" {
            return Ok(Alignment { operations });
        }
        let mut count: u64 = 0;
        let mut saw_digit = false;
        for c in text.chars() {
            if let Some(d) = c.to_digit(10) {
                count = count * 10 + d as u64;
                saw_digit = true;
                continue;
            }
            let op = match c {
                'M' => CigarOp::Match,
                'X' => CigarOp::Mismatch,
                '=' => CigarOp::Equal,
                'I' => CigarOp::Insertion,
                'D' => CigarOp::Deletion,
                other => {
                    return Err(BluntifyError::Parse {
                        line,
                        msg: format!("unsupported CIGAR operation '{other}' in '{text}'"),
                    })
                }
            };
            if !saw_digit {
                return Err(BluntifyError::Parse {
                    line,
                    msg: format!("CIGAR operation without a length in '{text}'"),
                });
            }
            operations.push((count, op));
            count = 0;
            saw_digit = false;
        }
        if saw_digit {
            return Err(BluntifyError::Parse {
                line,
                msg: format!("trailing CIGAR length in '{text}'"),
            });
        }
        Ok(Alignment { operations })
    }

    /// `(source_consumed, sink_consumed)` in input-strand coordinates.
    pub fn compute_lengths(&self) -> (u64, u64) {
        let mut left = 0;
        let mut right = 0;
        for &(n, op) in &self.operations {
            match op {
                CigarOp::Match | CigarOp::Mismatch | CigarOp::Equal => {
                    left += n;
                    right += n;
                }
                CigarOp::Deletion => left += n,
                CigarOp::Insertion => right += n,
            }
        }
        (left, right)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
