//! End-to-end orchestration: load, cover, duplicate, align, splice, stitch,
//! trace, write.

use std::io::{BufRead, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::adjacency::compute_all_adjacency_components;
use crate::biclique::{
    compute_cover, deduplicate_and_canonicalize, BicliqueEdgeIndex, Bicliques,
};
use crate::duplicate::Duplicator;
use crate::error::Result;
use crate::gfa::{read_gfa, write_gfa, IdMap};
use crate::graph::{Edge, Handle, HashGraph};
use crate::overlapping::splice_overlapping_overlaps;
use crate::overlaps::OverlapMap;
use crate::poa::{align_biclique_overlaps, Subgraph};
use crate::provenance::{compute_provenance, write_provenance, ProvenanceMap};
use crate::splice::splice_subgraphs;

pub struct Bluntifier {
    pub graph: HashGraph,
    pub id_map: IdMap,
    pub overlaps: OverlapMap,
    pub bicliques: Bicliques,
    node_to_biclique_edge: Vec<Vec<BicliqueEdgeIndex>>,
    subgraphs: Vec<Subgraph>,
    to_be_destroyed: FxHashSet<u64>,
    pub provenance: ProvenanceMap,
    verbose: bool,
}

impl Bluntifier {
    pub fn from_reader<R: BufRead>(reader: R, verbose: bool) -> Result<Self> {
        let mut graph = HashGraph::new();
        let mut id_map = IdMap::new();
        let mut overlaps = OverlapMap::new();
        read_gfa(reader, &mut graph, &mut id_map, &mut overlaps)?;
        Ok(Bluntifier {
            graph,
            id_map,
            overlaps,
            bicliques: Bicliques::default(),
            node_to_biclique_edge: Vec::new(),
            subgraphs: Vec::new(),
            to_be_destroyed: FxHashSet::default(),
            provenance: ProvenanceMap::new(),
            verbose,
        })
    }

    fn log(&self, msg: &str) {
        if self.verbose {
            eprintln!("[INFO] {msg}");
        }
    }

    /// Run the whole rewrite. `threads` bounds the biclique-cover worker
    /// pool; 0 uses the rayon default.
    pub fn bluntify(&mut self, threads: usize) -> Result<()> {
        let original_node_count = self.id_map.len() as u64;
        self.compute_biclique_covers(threads)?;
        self.log(&format!("total bicliques: {}", self.bicliques.len()));

        self.map_splice_sites_by_node(original_node_count);

        let mut duplicator = Duplicator::new(&self.node_to_biclique_edge);
        duplicator.duplicate_all_node_termini(
            &mut self.graph,
            &mut self.bicliques,
            &mut self.overlaps,
            original_node_count,
        )?;
        let child_to_parent = duplicator.child_to_parent;
        let overlapping = duplicator.overlapping_overlaps;
        self.log(&format!(
            "duplicated termini: {} children, {} overlapping-overlap nodes",
            child_to_parent.len(),
            overlapping.len()
        ));

        self.harmonize_biclique_orientations();

        self.subgraphs.clear();
        for i in 0..self.bicliques.len() {
            let skip = |_side: bool, handle: Handle| {
                overlapping.values().any(|record| {
                    record.children.iter().flatten().any(|oc| {
                        oc.biclique_index == i && oc.anchor.id() == handle.id()
                    })
                })
            };
            let subgraph =
                align_biclique_overlaps(&self.graph, &self.bicliques[i], &skip)?;
            self.subgraphs.push(subgraph);
        }

        splice_subgraphs(
            &mut self.graph,
            &self.subgraphs,
            &self.overlaps,
            &child_to_parent,
            &overlapping,
            &mut self.to_be_destroyed,
        )?;

        splice_overlapping_overlaps(
            &mut self.graph,
            &self.bicliques,
            &self.overlaps,
            &self.subgraphs,
            &overlapping,
            &self.to_be_destroyed,
        )?;

        // termini anchored in place resolve to their parent for re-factoring
        let mut resolve_to_parent = child_to_parent.clone();
        for (&parent, record) in &overlapping {
            for side in [false, true] {
                for oc in &record.children[side as usize] {
                    resolve_to_parent
                        .entry(oc.anchor.id())
                        .or_insert((parent, side));
                }
            }
        }

        self.provenance = compute_provenance(
            &self.graph,
            original_node_count,
            &self.node_to_biclique_edge,
            &child_to_parent,
            &resolve_to_parent,
            &self.bicliques,
            &self.overlaps,
            &self.to_be_destroyed,
        )?;

        let mut doomed: Vec<u64> = self.to_be_destroyed.iter().copied().collect();
        doomed.sort_unstable();
        for id in doomed {
            self.provenance.remove(&id);
            self.graph.destroy_handle(id);
        }
        self.log(&format!(
            "final graph: {} nodes",
            self.graph.node_count()
        ));
        Ok(())
    }

    /// Per adjacency component, in parallel: decompose into bipartite
    /// blocks, cover each, deduplicate, and append under the shared mutex.
    /// Results are flushed in component order so output ids are
    /// machine-independent.
    fn compute_biclique_covers(&mut self, threads: usize) -> Result<()> {
        let components = compute_all_adjacency_components(&self.graph, &self.overlaps);
        self.log(&format!("total adjacency components: {}", components.len()));

        let collected: Mutex<Vec<(usize, Vec<Vec<Edge>>)>> = Mutex::new(Vec::new());
        let bar = ProgressBar::new(components.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message("covering");

        // a size-1 component is a side adjacent to itself (reversing loop);
        // it still gets a cover
        let work = |(i, component): (usize, &crate::adjacency::AdjacencyComponent)| -> Result<()> {
            let mut covers: Vec<Vec<Edge>> = Vec::new();
            component.decompose_into_bipartite_blocks(
                &self.graph,
                &self.overlaps,
                &mut |left, right| {
                    let cover = compute_cover(&self.graph, &self.overlaps, left, right);
                    covers.extend(deduplicate_and_canonicalize(cover, &self.overlaps)?);
                    Ok(())
                },
            )?;
            if !covers.is_empty() {
                let mut guard = collected.lock().expect("biclique mutex poisoned");
                guard.push((i, covers));
            }
            bar.inc(1);
            Ok(())
        };

        let run = || -> Result<()> {
            components
                .par_iter()
                .enumerate()
                .map(|item| work(item))
                .collect::<Result<Vec<()>>>()?;
            Ok(())
        };
        if threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            pool.install(run)?;
        } else {
            run()?;
        }
        bar.finish_and_clear();

        let mut collected = collected.into_inner().expect("biclique mutex poisoned");
        collected.sort_by_key(|&(i, _)| i);
        for (_, covers) in collected {
            self.bicliques.bicliques.extend(covers);
        }
        Ok(())
    }

    /// Map each original node to its participating biclique edges; a
    /// self-loop is mapped once.
    fn map_splice_sites_by_node(&mut self, original_node_count: u64) {
        self.node_to_biclique_edge =
            vec![Vec::new(); original_node_count as usize + 1];
        for i in 0..self.bicliques.len() {
            for (j, edge) in self.bicliques[i].iter().enumerate() {
                let index = BicliqueEdgeIndex {
                    biclique_index: i,
                    edge_index: j,
                };
                let left = edge.0.id();
                let right = edge.1.id();
                self.node_to_biclique_edge[left as usize].push(index);
                if right != left {
                    self.node_to_biclique_edge[right as usize].push(index);
                }
            }
        }
    }

    /// Flip biclique edges so every edge of a biclique reads left set ->
    /// right set; lookups into the overlap map re-canonicalize as needed.
    fn harmonize_biclique_orientations(&mut self) {
        for biclique in &mut self.bicliques.bicliques {
            let mut left: FxHashSet<Handle> = FxHashSet::default();
            let mut right: FxHashSet<Handle> = FxHashSet::default();
            for edge in biclique.iter_mut() {
                let flipped = edge.flipped();
                let keep_support = left.contains(&edge.0) as i32
                    + right.contains(&edge.1) as i32
                    - left.contains(&edge.1) as i32
                    - right.contains(&edge.0) as i32;
                let flip_support = left.contains(&flipped.0) as i32
                    + right.contains(&flipped.1) as i32
                    - left.contains(&flipped.1) as i32
                    - right.contains(&flipped.0) as i32;
                if flip_support > keep_support {
                    *edge = flipped;
                }
                left.insert(edge.0);
                right.insert(edge.1);
            }
        }
    }

    pub fn write_gfa<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_gfa(&self.graph, writer)
    }

    pub fn write_provenance<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_provenance(&self.provenance, writer)
    }
}

/// Convenience wrapper used by the CLI and the end-to-end tests.
pub fn bluntify_gfa_text(input: &str, threads: usize, verbose: bool) -> Result<Bluntifier> {
    let mut bluntifier = Bluntifier::from_reader(input.as_bytes(), verbose)?;
    bluntifier.bluntify(threads)?;
    Ok(bluntifier)
}
