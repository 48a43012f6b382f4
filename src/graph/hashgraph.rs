//! Hash-based mutable sequence graph with embedded paths.
//!
//! Nodes carry their forward-strand sequence and two neighbor lists, one per
//! node end. Edges are stored on both endpoints. Paths are named step lists;
//! a node -> path occurrence index keeps path rewriting cheap when nodes are
//! split or destroyed.

use bio::alphabets::dna;
use rustc_hash::{FxHashMap, FxHashSet};

use super::handle::{Edge, Handle};

/// Read access to graph adjacency. Implemented by [`HashGraph`] and by the
/// subtractive overlay used during cover simplification.
pub trait GraphView {
    /// Visit the neighbors of `handle` on one side. `go_left == false` visits
    /// handles `t` with an edge `(handle, t)`; `go_left == true` visits
    /// handles `u` with an edge `(u, handle)`. Return `false` from `visit` to
    /// stop early.
    fn follow_edges(&self, handle: Handle, go_left: bool, visit: &mut dyn FnMut(Handle) -> bool);

    fn has_edge(&self, a: Handle, b: Handle) -> bool;

    fn degree(&self, handle: Handle, go_left: bool) -> usize {
        let mut n = 0;
        self.follow_edges(handle, go_left, &mut |_| {
            n += 1;
            true
        });
        n
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    sequence: Vec<u8>,
    /// Handles `u` such that the edge `(u, forward)` exists.
    left: Vec<Handle>,
    /// Handles `t` such that the edge `(forward, t)` exists.
    right: Vec<Handle>,
}

/// Where an edge endpoint is stored on its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndSlot {
    node: u64,
    on_left: bool,
    value: Handle,
}

/// The two storage slots of an edge. Identical for both equivalent forms.
fn edge_slots(Edge(a, b): Edge) -> (EndSlot, EndSlot) {
    let first = EndSlot {
        node: a.id(),
        on_left: a.is_reverse(),
        value: if a.is_reverse() { b.flip() } else { b },
    };
    let second = EndSlot {
        node: b.id(),
        on_left: !b.is_reverse(),
        value: if b.is_reverse() { a.flip() } else { a },
    };
    (first, second)
}

#[derive(Debug, Default)]
pub struct HashGraph {
    nodes: FxHashMap<u64, Node>,
    paths: FxHashMap<String, Vec<Handle>>,
    /// node id -> names of paths with a step on that node
    occurrences: FxHashMap<u64, FxHashSet<String>>,
    next_id: u64,
}

impl HashGraph {
    pub fn new() -> Self {
        HashGraph {
            nodes: FxHashMap::default(),
            paths: FxHashMap::default(),
            occurrences: FxHashMap::default(),
            next_id: 1,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_node(&self, id: u64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn max_node_id(&self) -> u64 {
        self.nodes.keys().copied().max().unwrap_or(0)
    }

    pub fn create_node(&mut self, sequence: Vec<u8>) -> Handle {
        let id = self.next_id;
        self.create_node_with_id(id, sequence)
    }

    pub fn create_node_with_id(&mut self, id: u64, sequence: Vec<u8>) -> Handle {
        debug_assert!(!self.nodes.contains_key(&id), "node id {id} already exists");
        self.nodes.insert(
            id,
            Node {
                sequence,
                left: Vec::new(),
                right: Vec::new(),
            },
        );
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        Handle::forward(id)
    }

    pub fn length(&self, handle: Handle) -> usize {
        self.nodes[&handle.id()].sequence.len()
    }

    /// The sequence read along `handle`'s orientation.
    pub fn sequence(&self, handle: Handle) -> Vec<u8> {
        let seq = &self.nodes[&handle.id()].sequence;
        if handle.is_reverse() {
            dna::revcomp(seq.as_slice())
        } else {
            seq.clone()
        }
    }

    pub fn create_edge(&mut self, edge: Edge) {
        if self.has_edge(edge.0, edge.1) {
            return;
        }
        let (s1, s2) = edge_slots(edge);
        self.push_slot(s1);
        if s2 != s1 {
            self.push_slot(s2);
        }
    }

    pub fn destroy_edge(&mut self, edge: Edge) {
        let (s1, s2) = edge_slots(edge);
        self.remove_slot(s1);
        if s2 != s1 {
            self.remove_slot(s2);
        }
    }

    fn push_slot(&mut self, slot: EndSlot) {
        let node = self.nodes.get_mut(&slot.node).expect("edge endpoint missing");
        let list = if slot.on_left { &mut node.left } else { &mut node.right };
        list.push(slot.value);
    }

    fn remove_slot(&mut self, slot: EndSlot) {
        if let Some(node) = self.nodes.get_mut(&slot.node) {
            let list = if slot.on_left { &mut node.left } else { &mut node.right };
            if let Some(pos) = list.iter().position(|&h| h == slot.value) {
                list.swap_remove(pos);
            }
        }
    }

    /// Destroy a node together with its edges and any path through it.
    pub fn destroy_handle(&mut self, id: u64) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for u in &node.left {
            if u.id() != id {
                let (s1, s2) = edge_slots(Edge(*u, Handle::forward(id)));
                for s in [s1, s2] {
                    if s.node != id {
                        self.remove_slot(s);
                    }
                }
            }
        }
        for t in &node.right {
            if t.id() != id {
                let (s1, s2) = edge_slots(Edge(Handle::forward(id), *t));
                for s in [s1, s2] {
                    if s.node != id {
                        self.remove_slot(s);
                    }
                }
            }
        }
        if let Some(path_names) = self.occurrences.remove(&id) {
            for name in path_names {
                if let Some(steps) = self.paths.remove(&name) {
                    for step in steps {
                        if let Some(occ) = self.occurrences.get_mut(&step.id()) {
                            occ.remove(&name);
                        }
                    }
                }
            }
        }
    }

    pub fn for_each_handle(&self, visit: &mut dyn FnMut(Handle)) {
        let mut ids: Vec<u64> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            visit(Handle::forward(id));
        }
    }

    /// Visit every edge exactly once, in canonical form, deterministically.
    pub fn for_each_edge(&self, visit: &mut dyn FnMut(Edge)) {
        let mut edges: Vec<Edge> = Vec::new();
        for (&id, node) in &self.nodes {
            let fwd = Handle::forward(id);
            for &t in &node.right {
                let e = Edge(fwd, t);
                if e.canonical() == e {
                    edges.push(e);
                }
            }
            for &u in &node.left {
                if u.is_reverse() {
                    let e = Edge(u, fwd);
                    if e.canonical() == e {
                        edges.push(e);
                    }
                }
            }
        }
        edges.sort_unstable();
        edges.dedup();
        for e in edges {
            visit(e);
        }
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    pub fn create_path(&mut self, name: &str) {
        self.paths.entry(name.to_string()).or_default();
    }

    pub fn has_path(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn append_step(&mut self, name: &str, step: Handle) {
        self.paths
            .get_mut(name)
            .expect("append to unknown path")
            .push(step);
        self.occurrences
            .entry(step.id())
            .or_default()
            .insert(name.to_string());
    }

    pub fn path_steps(&self, name: &str) -> Option<&[Handle]> {
        self.paths.get(name).map(|v| v.as_slice())
    }

    pub fn path_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.paths.keys().cloned().collect();
        names.sort();
        names
    }

    // ------------------------------------------------------------------
    // Splitting
    // ------------------------------------------------------------------

    /// Split a node at `offsets` (relative to `handle`'s orientation) into
    /// fresh-id pieces. End edges move to the boundary pieces, internal
    /// chain edges are created, and every path step through the node is
    /// rewritten. Returns the pieces oriented along `handle`.
    pub fn split_handle(&mut self, handle: Handle, offsets: &[usize]) -> Vec<Handle> {
        let len = self.length(handle);
        let mut cuts: Vec<usize> = offsets
            .iter()
            .copied()
            .filter(|&o| o > 0 && o < len)
            .collect();
        cuts.sort_unstable();
        cuts.dedup();
        if cuts.is_empty() {
            return vec![handle];
        }
        if handle.is_reverse() {
            let mut fwd_cuts: Vec<usize> = cuts.iter().map(|&o| len - o).collect();
            fwd_cuts.sort_unstable();
            let mut pieces = self.split_forward(handle.id(), &fwd_cuts);
            pieces.reverse();
            return pieces.into_iter().map(Handle::flip).collect();
        }
        self.split_forward(handle.id(), &cuts)
    }

    fn split_forward(&mut self, id: u64, cuts: &[usize]) -> Vec<Handle> {
        let node = self.nodes.remove(&id).expect("split of unknown node");
        let fwd = Handle::forward(id);

        // Detach the partners' references to the dying node.
        for &u in &node.left {
            if u.id() != id {
                let (on_partner, _) = edge_slots(Edge(u, fwd));
                self.remove_slot(on_partner);
            }
        }
        for &t in &node.right {
            if t.id() != id {
                let (_, on_partner) = edge_slots(Edge(fwd, t));
                self.remove_slot(on_partner);
            }
        }

        // Carve the sequence.
        let mut cuts_full = Vec::with_capacity(cuts.len() + 2);
        cuts_full.push(0);
        cuts_full.extend_from_slice(cuts);
        cuts_full.push(node.sequence.len());
        let mut pieces: Vec<Handle> = Vec::with_capacity(cuts_full.len() - 1);
        for w in cuts_full.windows(2) {
            let piece = self.create_node(node.sequence[w[0]..w[1]].to_vec());
            pieces.push(piece);
        }
        for w in pieces.windows(2) {
            self.create_edge(Edge(w[0], w[1]));
        }
        let first = pieces[0];
        let last = *pieces.last().unwrap();

        // Reattach end edges, remapping self-referencing partners onto the
        // boundary piece that carries the original end.
        for &u in &node.left {
            let source = if u.id() != id {
                u
            } else if u == fwd {
                last // exits the forward end
            } else {
                first.flip() // reversing loop at the forward start
            };
            self.create_edge(Edge(source, first));
        }
        for &t in &node.right {
            let target = if t.id() != id {
                t
            } else if t == fwd {
                first // re-enters through the forward start
            } else {
                last.flip() // reversing loop at the forward end
            };
            self.create_edge(Edge(last, target));
        }

        // Rewrite paths through the node.
        if let Some(path_names) = self.occurrences.remove(&id) {
            for name in path_names {
                let steps = self.paths.get(&name).cloned().unwrap_or_default();
                let mut rewritten: Vec<Handle> = Vec::with_capacity(steps.len() + pieces.len());
                for step in steps {
                    if step.id() != id {
                        rewritten.push(step);
                    } else if !step.is_reverse() {
                        rewritten.extend_from_slice(&pieces);
                    } else {
                        rewritten.extend(pieces.iter().rev().map(|h| h.flip()));
                    }
                }
                for step in &rewritten {
                    self.occurrences
                        .entry(step.id())
                        .or_default()
                        .insert(name.clone());
                }
                self.paths.insert(name, rewritten);
            }
        }

        pieces
    }

    // ------------------------------------------------------------------
    // Subgraph copy
    // ------------------------------------------------------------------

    /// Copy every node, edge and path of `self` into `target`, shifting node
    /// ids past `target`'s current maximum. Returns the id offset.
    pub fn copy_into(&self, target: &mut HashGraph) -> u64 {
        let offset = target.max_node_id();
        let shift =
            |h: Handle| -> Handle { Handle::new(h.id() + offset, h.is_reverse()) };
        self.for_each_handle(&mut |h| {
            target.create_node_with_id(h.id() + offset, self.sequence(h));
        });
        self.for_each_edge(&mut |e| {
            target.create_edge(Edge(shift(e.0), shift(e.1)));
        });
        for name in self.path_names() {
            target.create_path(&name);
            for &step in self.path_steps(&name).unwrap() {
                target.append_step(&name, shift(step));
            }
        }
        offset
    }
}

impl GraphView for HashGraph {
    fn follow_edges(&self, handle: Handle, go_left: bool, visit: &mut dyn FnMut(Handle) -> bool) {
        let Some(node) = self.nodes.get(&handle.id()) else {
            return;
        };
        // Pick the stored list matching this orientation and side, flipping
        // entries when reading from the reverse strand.
        let (list, flip) = match (handle.is_reverse(), go_left) {
            (false, false) => (&node.right, false),
            (false, true) => (&node.left, false),
            (true, false) => (&node.left, true),
            (true, true) => (&node.right, true),
        };
        for &entry in list {
            let out = if flip { entry.flip() } else { entry };
            if !visit(out) {
                return;
            }
        }
    }

    fn has_edge(&self, a: Handle, b: Handle) -> bool {
        let (s1, _) = edge_slots(Edge(a, b));
        match self.nodes.get(&s1.node) {
            Some(node) => {
                let list = if s1.on_left { &node.left } else { &node.right };
                list.contains(&s1.value)
            }
            None => false,
        }
    }
}
