//! Canonical lookup of overlap records per directed edge.
//!
//! An edge and its reverse-complement form resolve to the same record; the
//! key present in the map is the canonical form. After any graph edit the
//! map is kept in sync through [`OverlapMap::update_edge`].

use rustc_hash::FxHashMap;

use crate::cigar::Alignment;
use crate::error::{BluntifyError, Result};
use crate::graph::Edge;

#[derive(Debug, Default)]
pub struct OverlapMap {
    overlaps: FxHashMap<Edge, Alignment>,
}

impl OverlapMap {
    pub fn new() -> Self {
        OverlapMap {
            overlaps: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.overlaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlaps.is_empty()
    }

    pub fn insert(&mut self, edge: Edge, alignment: Alignment) {
        self.overlaps.insert(edge, alignment);
    }

    pub fn find(&self, edge: Edge) -> Option<&Alignment> {
        self.overlaps.get(&edge)
    }

    /// Look up `edge` as given; if absent, flip both handles and retry.
    /// Returns the key form under which the record was found.
    pub fn canonicalize_and_find(&self, edge: Edge) -> Result<(Edge, &Alignment)> {
        if let Some(alignment) = self.overlaps.get(&edge) {
            return Ok((edge, alignment));
        }
        let flipped = edge.flipped();
        match self.overlaps.get(&flipped) {
            Some(alignment) => Ok((flipped, alignment)),
            None => Err(BluntifyError::MissingOverlap(
                edge.0.to_string(),
                edge.1.to_string(),
            )),
        }
    }

    /// `(source_consumed, sink_consumed)` oriented along the *given* edge
    /// form, swapping sides when the record is stored flipped.
    pub fn oriented_lengths(&self, edge: Edge) -> Result<(u64, u64)> {
        let (key, alignment) = self.canonicalize_and_find(edge)?;
        let (u, v) = alignment.compute_lengths();
        if key == edge {
            Ok((u, v))
        } else {
            Ok((v, u))
        }
    }

    /// Rekey a record after the graph edge it describes was rewired.
    pub fn update_edge(&mut self, old: Edge, new: Edge) {
        let record = self
            .overlaps
            .remove(&old)
            .or_else(|| self.overlaps.remove(&old.flipped()));
        if let Some(alignment) = record {
            self.overlaps.insert(new, alignment);
        }
    }

    pub fn for_each_edge(&self, visit: &mut dyn FnMut(Edge, &Alignment)) {
        for (&edge, alignment) in &self.overlaps {
            visit(edge, alignment);
        }
    }
}
