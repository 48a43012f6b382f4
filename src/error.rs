//! Error kinds surfaced by the bluntification pipeline.
//!
//! Every kind except [`BluntifyError::InconsistentSuccessor`] aborts the run.
//! `InconsistentSuccessor` is raised while building a centered Galois tree on
//! a graph that is not domino-free; the cover driver catches it and falls
//! back to the heuristic cover.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BluntifyError {
    /// Malformed GFA input.
    #[error("GFA parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// An edge exists in the graph with no overlap record, even after
    /// canonicalization by flipping both handles.
    #[error("edge not found in overlaps: ({0})->({1})")]
    MissingOverlap(String, String),

    /// A biclique-participating terminus has no surviving parent to splice
    /// against.
    #[error("biclique terminus does not have any parent: {0}")]
    OrphanedTerminus(u64),

    /// Factorization found neither endpoint of a biclique edge equal to the
    /// node being factored.
    #[error("parent node not found on either side of edge: parent {parent}, edge {from}->{to}")]
    ParentNotFoundOnEdge { parent: u64, from: u64, to: u64 },

    /// A centered Galois tree asserted two different immediate successors for
    /// the same equivalence class: the graph is not domino-free from this
    /// center. Recovered by falling back to the heuristic cover.
    #[error("inconsistent successor in Galois tree: graph is not domino-free")]
    InconsistentSuccessor,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BluntifyError>;
