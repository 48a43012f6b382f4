//! Per-biclique partial-order collapse.
//!
//! Every terminus participating in a biclique spells the same overlap
//! region, so the biclique is represented by one small DAG: participants are
//! threaded longest-first into a base-per-node graph via semi-global
//! alignment (leading and trailing graph bases are free), reusing matched
//! nodes and branching on disagreements. Each participant keeps a path
//! spelling exactly its own sequence; identical overlaps collapse to a
//! single chain and nested ones share their common span.

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graph::{Edge, Handle, HashGraph};

const MATCH: i64 = 2;
const MISMATCH: i64 = -2;
const GAP: i64 = -3;

#[derive(Debug, Clone)]
pub struct PathInfo {
    pub path_name: String,
    pub biclique_side: bool,
}

/// The collapsed representation of one biclique, ready for splicing.
#[derive(Debug)]
pub struct Subgraph {
    pub graph: HashGraph,
    /// Per biclique side: participant handle (in the main graph) -> its path.
    pub paths_per_handle: [FxHashMap<Handle, PathInfo>; 2],
}

/// Name of the subgraph path that spells one terminus.
pub fn terminus_path_name(handle: Handle, biclique_side: bool) -> String {
    format!("{}_{}", handle.id(), biclique_side as u8)
}

/// Build the collapsed subgraph for one biclique. `skip` filters out
/// participants whose sequence is stitched later by the overlapping-overlap
/// pass.
pub fn align_biclique_overlaps(
    main: &HashGraph,
    biclique: &[Edge],
    skip: &dyn Fn(bool, Handle) -> bool,
) -> Result<Subgraph> {
    // One participant per distinct terminus handle per side.
    let mut participants: Vec<(bool, Handle, Vec<u8>)> = Vec::new();
    let mut seen: [Vec<Handle>; 2] = [Vec::new(), Vec::new()];
    for &Edge(a, b) in biclique {
        for (side, handle) in [(false, a), (true, b)] {
            if seen[side as usize].contains(&handle) || skip(side, handle) {
                continue;
            }
            seen[side as usize].push(handle);
            participants.push((side, handle, main.sequence(handle)));
        }
    }
    participants.sort_by(|x, y| {
        y.2.len()
            .cmp(&x.2.len())
            .then(x.1.cmp(&y.1))
            .then(x.0.cmp(&y.0))
    });

    let mut dag = Dag::default();
    let mut paths: Vec<(bool, Handle, Vec<usize>)> = Vec::new();
    for (side, handle, seq) in participants {
        let nodes = dag.thread(&seq);
        paths.push((side, handle, nodes));
    }
    dag.compress(&mut paths);
    Ok(dag.into_subgraph(paths))
}

/// Base-per-node alignment DAG, compressed into unary chains at the end.
#[derive(Debug, Default)]
struct Dag {
    seqs: Vec<Vec<u8>>,
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    alive: Vec<bool>,
}

/// One cell of the traceback: where the best score came from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Back {
    Start,
    /// diagonal from (pred, j - 1); `usize::MAX` encodes the virtual start
    Diagonal(usize),
    /// graph gap from (pred, j)
    Skip(usize),
    /// sequence gap from (node, j - 1)
    Insert,
}

impl Dag {
    fn add_node(&mut self, base: u8) -> usize {
        self.seqs.push(vec![base]);
        self.succs.push(Vec::new());
        self.preds.push(Vec::new());
        self.alive.push(true);
        self.seqs.len() - 1
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if !self.succs[from].contains(&to) {
            self.succs[from].push(to);
            self.preds[to].push(from);
        }
    }

    fn topological_order(&self) -> Vec<usize> {
        let n = self.seqs.len();
        let mut indegree: Vec<usize> = (0..n).map(|v| self.preds[v].len()).collect();
        let mut ready: Vec<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
        ready.sort_unstable();
        let mut order = Vec::with_capacity(n);
        while let Some(v) = ready.pop() {
            order.push(v);
            for &w in &self.succs[v] {
                indegree[w] -= 1;
                if indegree[w] == 0 {
                    ready.push(w);
                }
            }
        }
        order
    }

    /// Align `seq` against the DAG and weave it in, returning its path.
    fn thread(&mut self, seq: &[u8]) -> Vec<usize> {
        let m = seq.len();
        if self.seqs.is_empty() {
            // first participant seeds the backbone
            let mut path = Vec::with_capacity(m);
            let mut prev: Option<usize> = None;
            for &c in seq {
                let v = self.add_node(c);
                if let Some(p) = prev {
                    self.add_edge(p, v);
                }
                path.push(v);
                prev = Some(v);
            }
            return path;
        }

        let order = self.topological_order();
        let n = self.seqs.len();
        let neg = i64::MIN / 2;
        // dp[v][j]: best score with the alignment ending at node v, having
        // consumed j sequence characters; row n is the virtual start.
        let mut dp = vec![vec![neg; m + 1]; n + 1];
        let mut back = vec![vec![Back::Start; m + 1]; n + 1];
        for j in 0..=m {
            dp[n][j] = GAP * j as i64;
            back[n][j] = if j == 0 { Back::Start } else { Back::Insert };
        }
        for &v in &order {
            let base = self.seqs[v][0];
            for j in 0..=m {
                // free leading graph bases: the virtual start feeds every node
                let mut best = if j > 0 {
                    let sub = if seq[j - 1] == base { MATCH } else { MISMATCH };
                    (dp[n][j - 1] + sub, Back::Diagonal(usize::MAX))
                } else {
                    (neg, Back::Start)
                };
                if dp[n][j] + GAP > best.0 {
                    best = (dp[n][j] + GAP, Back::Skip(usize::MAX));
                }
                for &p in &self.preds[v] {
                    if j > 0 {
                        let sub = if seq[j - 1] == base { MATCH } else { MISMATCH };
                        if dp[p][j - 1] + sub > best.0 {
                            best = (dp[p][j - 1] + sub, Back::Diagonal(p));
                        }
                    }
                    if dp[p][j] + GAP > best.0 {
                        best = (dp[p][j] + GAP, Back::Skip(p));
                    }
                }
                if j > 0 && dp[v][j - 1] + GAP > best.0 {
                    best = (dp[v][j - 1] + GAP, Back::Insert);
                }
                dp[v][j] = best.0;
                back[v][j] = best.1;
            }
        }

        // free trailing graph bases: finish at any node
        let mut end = n;
        for v in 0..n {
            if dp[v][m] > dp[end][m] {
                end = v;
            }
        }

        // Trace back into (op, node, seq index) triples, then weave forward.
        #[derive(Debug)]
        enum Op {
            MatchAt(usize, usize),
            InsertChar(usize),
        }
        let mut ops: Vec<Op> = Vec::new();
        let (mut v, mut j) = (end, m);
        loop {
            match back[v][j] {
                Back::Start => break,
                Back::Diagonal(p) => {
                    ops.push(Op::MatchAt(v, j - 1));
                    j -= 1;
                    v = if p == usize::MAX { n } else { p };
                    if v == n && j == 0 {
                        break;
                    }
                }
                Back::Skip(p) => {
                    // graph base not used by this sequence
                    v = if p == usize::MAX { n } else { p };
                }
                Back::Insert => {
                    ops.push(Op::InsertChar(j - 1));
                    j -= 1;
                }
            }
            if v == n && j == 0 {
                break;
            }
        }
        ops.reverse();

        let mut path = Vec::with_capacity(m);
        let mut prev: Option<usize> = None;
        for op in ops {
            let node = match op {
                Op::MatchAt(v, idx) => {
                    if self.seqs[v][0] == seq[idx] {
                        v
                    } else {
                        self.add_node(seq[idx])
                    }
                }
                Op::InsertChar(idx) => self.add_node(seq[idx]),
            };
            if let Some(p) = prev {
                if p != node {
                    self.add_edge(p, node);
                }
            }
            path.push(node);
            prev = Some(node);
        }
        path
    }

    /// Merge unary chains where no path starts or ends at the seam.
    fn compress(&mut self, paths: &mut [(bool, Handle, Vec<usize>)]) {
        loop {
            let mut merged = false;
            for a in 0..self.seqs.len() {
                if !self.alive[a] || self.succs[a].len() != 1 {
                    continue;
                }
                let b = self.succs[a][0];
                if a == b || !self.alive[b] || self.preds[b].len() != 1 {
                    continue;
                }
                let seam_broken = paths.iter().any(|(_, _, p)| {
                    p.last() == Some(&a) || p.first() == Some(&b)
                });
                if seam_broken {
                    continue;
                }
                // pull b into a
                let b_seq = std::mem::take(&mut self.seqs[b]);
                self.seqs[a].extend_from_slice(&b_seq);
                let b_succs = std::mem::take(&mut self.succs[b]);
                self.succs[a] = b_succs.clone();
                for &w in &b_succs {
                    for p in self.preds[w].iter_mut() {
                        if *p == b {
                            *p = a;
                        }
                    }
                }
                self.preds[b].clear();
                self.alive[b] = false;
                for (_, _, p) in paths.iter_mut() {
                    p.retain(|&v| v != b);
                }
                merged = true;
                break;
            }
            if !merged {
                return;
            }
        }
    }

    fn into_subgraph(self, paths: Vec<(bool, Handle, Vec<usize>)>) -> Subgraph {
        let mut graph = HashGraph::new();
        let mut node_of: FxHashMap<usize, Handle> = FxHashMap::default();
        for v in 0..self.seqs.len() {
            if self.alive[v] {
                let h = graph.create_node(self.seqs[v].clone());
                node_of.insert(v, h);
            }
        }
        for v in 0..self.seqs.len() {
            if !self.alive[v] {
                continue;
            }
            for &w in &self.succs[v] {
                graph.create_edge(Edge(node_of[&v], node_of[&w]));
            }
        }
        let mut paths_per_handle: [FxHashMap<Handle, PathInfo>; 2] =
            [FxHashMap::default(), FxHashMap::default()];
        for (side, handle, nodes) in paths {
            let name = terminus_path_name(handle, side);
            graph.create_path(&name);
            for v in nodes {
                graph.append_step(&name, node_of[&v]);
            }
            paths_per_handle[side as usize].insert(
                handle,
                PathInfo {
                    path_name: name,
                    biclique_side: side,
                },
            );
        }
        Subgraph {
            graph,
            paths_per_handle,
        }
    }
}
