//! Graph container: handles, edges, and the hash-based path graph.

pub mod handle;
pub mod hashgraph;

pub use handle::{Edge, Handle};
pub use hashgraph::{GraphView, HashGraph};
