//! Shared utilities for graph algorithms
//!
//! Provides a read-only, dense view of the graph topology for algorithm execution.

/// Dense node index (0..node_count)
pub type NodeIndex = usize;

/// Dense edge index, the position of the edge in the list the view was built from
pub type EdgeIndex = usize;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Every adjacency slot also records the index of the edge that produced it, so callers can
/// map a traversal step back to their own edge storage (relation buckets, labels, ...).
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Number of edges
    pub edge_count: usize,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<NodeIndex>,
    /// Edge indices aligned with `out_targets`
    pub out_edges: Vec<EdgeIndex>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<NodeIndex>,
    /// Edge indices aligned with `in_sources`
    pub in_edges: Vec<EdgeIndex>,
}

impl GraphView {
    /// Build a view from `(source, target)` pairs. The i-th pair becomes edge index `i`.
    ///
    /// Within each adjacency slice, edges keep the order in which they were supplied.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint is `>= node_count`.
    pub fn from_edges<I>(node_count: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeIndex, NodeIndex)>,
    {
        let edges: Vec<(NodeIndex, NodeIndex)> = edges.into_iter().collect();
        let edge_count = edges.len();

        let mut out_offsets = vec![0usize; node_count + 1];
        let mut in_offsets = vec![0usize; node_count + 1];
        for &(src, dst) in &edges {
            assert!(
                src < node_count && dst < node_count,
                "edge ({}, {}) out of range for {} nodes",
                src,
                dst,
                node_count
            );
            out_offsets[src + 1] += 1;
            in_offsets[dst + 1] += 1;
        }
        for i in 0..node_count {
            out_offsets[i + 1] += out_offsets[i];
            in_offsets[i + 1] += in_offsets[i];
        }

        let mut out_targets = vec![0; edge_count];
        let mut out_edges = vec![0; edge_count];
        let mut in_sources = vec![0; edge_count];
        let mut in_edges = vec![0; edge_count];

        // Counting-sort fill cursors
        let mut out_cursor = out_offsets.clone();
        let mut in_cursor = in_offsets.clone();
        for (edge_idx, &(src, dst)) in edges.iter().enumerate() {
            let slot = out_cursor[src];
            out_targets[slot] = dst;
            out_edges[slot] = edge_idx;
            out_cursor[src] += 1;

            let slot = in_cursor[dst];
            in_sources[slot] = src;
            in_edges[slot] = edge_idx;
            in_cursor[dst] += 1;
        }

        GraphView {
            node_count,
            edge_count,
            out_offsets,
            out_targets,
            out_edges,
            in_offsets,
            in_sources,
            in_edges,
        }
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: NodeIndex) -> &[NodeIndex] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: NodeIndex) -> &[NodeIndex] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Edge indices of the outgoing edges of a node, aligned with [`successors`](Self::successors)
    pub fn outgoing_edges(&self, idx: NodeIndex) -> &[EdgeIndex] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_edges[start..end]
    }

    /// Edge indices of the incoming edges of a node, aligned with [`predecessors`](Self::predecessors)
    pub fn incoming_edges(&self, idx: NodeIndex) -> &[EdgeIndex] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_edges[start..end]
    }
}
