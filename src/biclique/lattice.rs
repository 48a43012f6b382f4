//! Galois lattice and minimum biclique cover via a minimum vertex separator.
//!
//! In a domino-free graph every maximal biclique is the biclique of some
//! centered-tree class, and the maximal bicliques containing any fixed edge
//! form a chain under containment. Threading each edge's chain as a top ->
//! bottom path and splitting every biclique node into a unit-capacity
//! `in -> out` edge makes a minimum vertex separator (Dinic max-flow) exactly
//! a minimum biclique cover: the separator must meet every edge's chain, and
//! any cover does so.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::bipartite::BipartiteGraph;
use crate::graph::Handle;

use super::galois_tree::CenteredGaloisTree;

#[derive(Debug)]
struct LatticeNode {
    left: Vec<Handle>,
    right: Vec<Handle>,
    left_set: FxHashSet<Handle>,
    right_set: FxHashSet<Handle>,
}

#[derive(Debug)]
pub struct GaloisLattice {
    nodes: Vec<LatticeNode>,
    /// per graph edge: the containment chain of bicliques covering it,
    /// largest right-neighborhood first
    chains: Vec<Vec<usize>>,
}

impl GaloisLattice {
    /// Build the lattice. Returns `None` when any center shows the graph is
    /// not domino-free; the caller falls back to the heuristic cover.
    pub fn new(graph: &BipartiteGraph) -> Option<Self> {
        let mut trees = Vec::new();
        for &center in graph.left() {
            if graph.get_degree(center) == 0 {
                // fully simplified away; nothing to cover from here
                continue;
            }
            match CenteredGaloisTree::new(graph, center) {
                Ok(tree) => trees.push(tree),
                Err(_) => return None,
            }
        }

        // The distinct maximal bicliques across all trees are the lattice's
        // real nodes; different centers rediscover the same biclique.
        let mut nodes: Vec<LatticeNode> = Vec::new();
        let mut index: FxHashMap<(Vec<Handle>, Vec<Handle>), usize> = FxHashMap::default();
        for tree in &trees {
            for class in 0..tree.size() {
                let (left, right) = tree.biclique(class);
                index.entry((left.clone(), right.clone())).or_insert_with(|| {
                    nodes.push(LatticeNode {
                        left_set: left.iter().copied().collect(),
                        right_set: right.iter().copied().collect(),
                        left,
                        right,
                    });
                    nodes.len() - 1
                });
            }
        }

        // Each edge's covering bicliques, ordered by decreasing right side
        // (equivalently increasing left side under containment).
        let mut chains = Vec::new();
        for &l in graph.left() {
            for r in graph.adjacent_sides(l) {
                let mut chain: Vec<usize> = (0..nodes.len())
                    .filter(|&i| {
                        nodes[i].left_set.contains(&l) && nodes[i].right_set.contains(&r)
                    })
                    .collect();
                if chain.is_empty() {
                    // every edge lies in at least one maximal biclique
                    return None;
                }
                chain.sort_by(|&a, &b| {
                    nodes[b]
                        .right
                        .len()
                        .cmp(&nodes[a].right.len())
                        .then(a.cmp(&b))
                });
                chains.push(chain);
            }
        }

        Some(GaloisLattice { nodes, chains })
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// The minimum biclique cover: the separator's bicliques.
    pub fn biclique_cover(&self) -> Vec<(Vec<Handle>, Vec<Handle>)> {
        self.separator()
            .into_iter()
            .map(|i| (self.nodes[i].left.clone(), self.nodes[i].right.clone()))
            .collect()
    }

    /// Minimum vertex separator between top and bottom, in node-index order.
    pub fn separator(&self) -> Vec<usize> {
        let n = self.nodes.len();
        if n == 0 {
            return Vec::new();
        }
        // node i is split into in(i) = 2i and out(i) = 2i + 1
        let source = 2 * n;
        let sink = 2 * n + 1;
        let mut flow = FlowNetwork::new(2 * n + 2);
        let mut across = Vec::with_capacity(n);
        for i in 0..n {
            across.push(flow.add_edge(2 * i, 2 * i + 1, 1));
        }
        // traversal edges are uncuttable; only across-the-node edges saturate
        let unbounded = i64::MAX / 4;
        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut link = |flow: &mut FlowNetwork, from: usize, to: usize| {
            if seen.insert((from, to)) {
                flow.add_edge(from, to, unbounded);
            }
        };
        for chain in &self.chains {
            link(&mut flow, source, 2 * chain[0]);
            for w in chain.windows(2) {
                link(&mut flow, 2 * w[0] + 1, 2 * w[1]);
            }
            link(&mut flow, 2 * chain[chain.len() - 1] + 1, sink);
        }
        flow.max_flow(source, sink);

        let reachable = flow.residual_reachable(source);
        (0..n)
            .filter(|&i| flow.saturated(across[i]) && reachable[2 * i] && !reachable[2 * i + 1])
            .collect()
    }
}

/// Dinic's algorithm over an explicit edge list with paired residuals.
struct FlowNetwork {
    adjacency: Vec<Vec<usize>>,
    to: Vec<usize>,
    capacity: Vec<i64>,
}

impl FlowNetwork {
    fn new(node_count: usize) -> Self {
        FlowNetwork {
            adjacency: vec![Vec::new(); node_count],
            to: Vec::new(),
            capacity: Vec::new(),
        }
    }

    /// Returns the forward edge's index; the paired residual is `index ^ 1`.
    fn add_edge(&mut self, from: usize, to: usize, capacity: i64) -> usize {
        let index = self.to.len();
        self.adjacency[from].push(index);
        self.to.push(to);
        self.capacity.push(capacity);
        self.adjacency[to].push(index + 1);
        self.to.push(from);
        self.capacity.push(0);
        index
    }

    fn saturated(&self, edge: usize) -> bool {
        self.capacity[edge] == 0
    }

    fn max_flow(&mut self, source: usize, sink: usize) -> i64 {
        let mut total = 0;
        loop {
            let level = self.bfs_levels(source);
            if level[sink].is_none() {
                return total;
            }
            let mut next = vec![0usize; self.adjacency.len()];
            loop {
                let pushed = self.blocking_dfs(source, sink, i64::MAX, &level, &mut next);
                if pushed == 0 {
                    break;
                }
                total += pushed;
            }
        }
    }

    fn bfs_levels(&self, source: usize) -> Vec<Option<usize>> {
        let mut level = vec![None; self.adjacency.len()];
        level[source] = Some(0);
        let mut queue = std::collections::VecDeque::from([source]);
        while let Some(here) = queue.pop_front() {
            let d = level[here].unwrap();
            for &e in &self.adjacency[here] {
                if self.capacity[e] > 0 && level[self.to[e]].is_none() {
                    level[self.to[e]] = Some(d + 1);
                    queue.push_back(self.to[e]);
                }
            }
        }
        level
    }

    fn blocking_dfs(
        &mut self,
        here: usize,
        sink: usize,
        limit: i64,
        level: &[Option<usize>],
        next: &mut [usize],
    ) -> i64 {
        if here == sink {
            return limit;
        }
        while next[here] < self.adjacency[here].len() {
            let e = self.adjacency[here][next[here]];
            let to = self.to[e];
            let ok = self.capacity[e] > 0
                && level[to].is_some()
                && level[to] == level[here].map(|d| d + 1);
            if ok {
                let pushed = self.blocking_dfs(to, sink, limit.min(self.capacity[e]), level, next);
                if pushed > 0 {
                    self.capacity[e] -= pushed;
                    self.capacity[e ^ 1] += pushed;
                    return pushed;
                }
            }
            next[here] += 1;
        }
        0
    }

    fn residual_reachable(&self, source: usize) -> Vec<bool> {
        let mut seen = vec![false; self.adjacency.len()];
        seen[source] = true;
        let mut queue = std::collections::VecDeque::from([source]);
        while let Some(here) = queue.pop_front() {
            for &e in &self.adjacency[here] {
                if self.capacity[e] > 0 && !seen[self.to[e]] {
                    seen[self.to[e]] = true;
                    queue.push_back(self.to[e]);
                }
            }
        }
        seen
    }
}
