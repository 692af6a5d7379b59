//! In-memory typed graph storage
//!
//! Nodes are partitioned by [`NodeType`], edges by [`CanonicalRelation`]. Both maps keep
//! first-seen order so every iteration over the graph is deterministic.
//!
//! A global CSR [`Topology`] spanning all node types is derived on first use. Node `(t, id)`
//! lives at global index `node_offsets[t] + id`; edge `i` of bucket `r` at
//! `edge_offsets[r] + i`.

use super::edge::{EdgeBucket, EdgeRef};
use super::node::{NodePartition, NodeRef};
use super::types::{CanonicalRelation, LocalId, NodeType};
use hetkg_graph_algorithms::{EdgeIndex, GraphView, NodeIndex};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(NodeType),

    #[error("Node {id} of type {node_type} not found")]
    NodeNotFound { node_type: NodeType, id: LocalId },

    #[error("Edge bucket {0} already exists")]
    RelationAlreadyExists(CanonicalRelation),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Per-type `name -> id` mapping, the companion document of a built graph
pub type NameMap = IndexMap<NodeType, IndexMap<String, LocalId>>;

/// Node and edge counts, per type and per bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_type: IndexMap<String, usize>,
    pub edges_by_relation: IndexMap<String, usize>,
}

/// Read-only CSR view over all node types
#[derive(Debug, Clone)]
pub struct Topology {
    view: GraphView,
    /// Global index of the first node of each partition; one extra trailing entry
    node_offsets: Vec<usize>,
    /// Global index of the first edge of each bucket; one extra trailing entry
    edge_offsets: Vec<usize>,
}

impl Topology {
    fn build(graph: &TypedGraph) -> Self {
        let mut node_offsets = Vec::with_capacity(graph.partitions.len() + 1);
        let mut acc = 0;
        for partition in graph.partitions.values() {
            node_offsets.push(acc);
            acc += partition.len();
        }
        node_offsets.push(acc);
        let node_count = acc;

        let mut edge_offsets = Vec::with_capacity(graph.relations.len() + 1);
        let mut edges = Vec::with_capacity(graph.total_edges());
        for (relation, bucket) in &graph.relations {
            edge_offsets.push(edges.len());
            // add_relation guarantees both endpoint partitions exist
            let src_base = graph
                .partitions
                .get_index_of(&relation.source)
                .map(|t| node_offsets[t])
                .unwrap_or_default();
            let dst_base = graph
                .partitions
                .get_index_of(&relation.target)
                .map(|t| node_offsets[t])
                .unwrap_or_default();
            edges.extend(bucket.iter().map(|edge| {
                (
                    src_base + edge.source as usize,
                    dst_base + edge.target as usize,
                )
            }));
        }
        edge_offsets.push(edges.len());

        Topology {
            view: GraphView::from_edges(node_count, edges),
            node_offsets,
            edge_offsets,
        }
    }

    pub fn view(&self) -> &GraphView {
        &self.view
    }

    /// Global index of node `id` in partition number `type_index`
    pub fn global_index(&self, type_index: usize, id: LocalId) -> NodeIndex {
        self.node_offsets[type_index] + id as usize
    }

    /// Partition number and local id of a global node index
    pub fn locate(&self, idx: NodeIndex) -> (usize, LocalId) {
        let type_index = self.node_offsets.partition_point(|&offset| offset <= idx) - 1;
        (type_index, (idx - self.node_offsets[type_index]) as LocalId)
    }

    /// Bucket number and position within the bucket of a global edge index
    pub fn locate_edge(&self, edge: EdgeIndex) -> (usize, usize) {
        let relation_index = self.edge_offsets.partition_point(|&offset| offset <= edge) - 1;
        (relation_index, edge - self.edge_offsets[relation_index])
    }
}

/// Heterogeneous graph: typed node partitions plus a canonical-triple edge index
///
/// Invariant: every edge endpoint exists in the partition of the matching type.
#[derive(Debug, Clone, Default)]
pub struct TypedGraph {
    partitions: IndexMap<NodeType, NodePartition>,
    relations: IndexMap<CanonicalRelation, EdgeBucket>,
    topology: OnceLock<Topology>,
}

impl TypedGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type without adding nodes; returns its partition number
    pub fn add_node_type(&mut self, node_type: &NodeType) -> usize {
        self.topology = OnceLock::new();
        match self.partitions.get_index_of(node_type) {
            Some(idx) => idx,
            None => {
                self.partitions.insert(node_type.clone(), NodePartition::new());
                self.partitions.len() - 1
            }
        }
    }

    /// Register an (empty) edge bucket, creating its endpoint types as needed
    pub fn add_relation(&mut self, relation: &CanonicalRelation) -> usize {
        self.add_node_type(&relation.source);
        self.add_node_type(&relation.target);
        match self.relations.get_index_of(relation) {
            Some(idx) => idx,
            None => {
                self.relations.insert(relation.clone(), EdgeBucket::new());
                self.relations.len() - 1
            }
        }
    }

    /// Resolve `(node_type, name)`, allocating the next id of that type if unseen
    pub fn add_node(&mut self, node_type: &NodeType, name: &str) -> LocalId {
        let idx = self.add_node_type(node_type);
        self.partitions[idx].get_or_insert(name)
    }

    /// Append a directed edge to the bucket of `relation`
    pub fn add_edge(
        &mut self,
        relation: &CanonicalRelation,
        source: LocalId,
        target: LocalId,
    ) -> GraphResult<()> {
        self.check_node(&relation.source, source)?;
        self.check_node(&relation.target, target)?;
        let idx = self.add_relation(relation);
        self.relations[idx].push(source, target);
        Ok(())
    }

    /// Append an edge between two named nodes, creating them if needed
    pub fn add_named_edge(&mut self, relation: &CanonicalRelation, source: &str, target: &str) {
        let source = self.add_node(&relation.source, source);
        let target = self.add_node(&relation.target, target);
        let idx = self.add_relation(relation);
        self.relations[idx].push(source, target);
    }

    /// Install a complete bucket, validating every endpoint
    pub fn add_bucket(&mut self, relation: CanonicalRelation, bucket: EdgeBucket) -> GraphResult<()> {
        if self.relations.contains_key(&relation) {
            return Err(GraphError::RelationAlreadyExists(relation));
        }
        let sources = self.partition(&relation.source).map(|p| p.len());
        let targets = self.partition(&relation.target).map(|p| p.len());
        let (sources, targets) = match (sources, targets) {
            (Some(s), Some(t)) => (s, t),
            (None, _) => return Err(GraphError::UnknownNodeType(relation.source)),
            (_, None) => return Err(GraphError::UnknownNodeType(relation.target)),
        };
        for edge in bucket.iter() {
            if edge.source as usize >= sources {
                return Err(GraphError::NodeNotFound {
                    node_type: relation.source,
                    id: edge.source,
                });
            }
            if edge.target as usize >= targets {
                return Err(GraphError::NodeNotFound {
                    node_type: relation.target,
                    id: edge.target,
                });
            }
        }
        self.topology = OnceLock::new();
        self.relations.insert(relation, bucket);
        Ok(())
    }

    fn check_node(&self, node_type: &NodeType, id: LocalId) -> GraphResult<()> {
        let partition = self
            .partition(node_type)
            .ok_or_else(|| GraphError::UnknownNodeType(node_type.clone()))?;
        if partition.contains_id(id) {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound {
                node_type: node_type.clone(),
                id,
            })
        }
    }

    /// Node types in first-seen order
    pub fn node_types(&self) -> impl Iterator<Item = &NodeType> {
        self.partitions.keys()
    }

    /// Partitions in first-seen order
    pub fn partitions(&self) -> impl Iterator<Item = (&NodeType, &NodePartition)> {
        self.partitions.iter()
    }

    /// Edge buckets in first-seen order
    pub fn relations(&self) -> impl Iterator<Item = (&CanonicalRelation, &EdgeBucket)> {
        self.relations.iter()
    }

    pub fn partition(&self, node_type: &NodeType) -> Option<&NodePartition> {
        self.partitions.get(node_type)
    }

    /// Partition number of a node type
    pub fn partition_index(&self, node_type: &NodeType) -> Option<usize> {
        self.partitions.get_index_of(node_type)
    }

    pub fn partition_at(&self, idx: usize) -> Option<(&NodeType, &NodePartition)> {
        self.partitions.get_index(idx)
    }

    pub fn bucket(&self, relation: &CanonicalRelation) -> Option<&EdgeBucket> {
        self.relations.get(relation)
    }

    pub fn relation_at(&self, idx: usize) -> Option<(&CanonicalRelation, &EdgeBucket)> {
        self.relations.get_index(idx)
    }

    /// Get node id by type and name
    pub fn node_id(&self, node_type: &NodeType, name: &str) -> Option<LocalId> {
        self.partitions.get(node_type)?.id_of(name)
    }

    /// Get node name by type and id
    pub fn node_name(&self, node_type: &NodeType, id: LocalId) -> Option<&str> {
        self.partitions.get(node_type)?.name_of(id)
    }

    /// Nodes of one type in ascending id order
    pub fn nodes(&self, node_type: &NodeType) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.partitions
            .get(node_type)
            .into_iter()
            .flat_map(|partition| partition.iter())
    }

    /// Edges of one bucket in insertion order
    pub fn edges(&self, relation: &CanonicalRelation) -> impl Iterator<Item = EdgeRef> + '_ {
        self.relations
            .get(relation)
            .into_iter()
            .flat_map(|bucket| bucket.iter())
    }

    pub fn num_node_types(&self) -> usize {
        self.partitions.len()
    }

    pub fn num_relations(&self) -> usize {
        self.relations.len()
    }

    /// Number of nodes of a given type
    pub fn num_nodes(&self, node_type: &NodeType) -> usize {
        self.partitions.get(node_type).map(|p| p.len()).unwrap_or(0)
    }

    /// Number of edges in a given bucket
    pub fn num_edges(&self, relation: &CanonicalRelation) -> usize {
        self.relations.get(relation).map(|b| b.len()).unwrap_or(0)
    }

    /// Get total number of nodes
    pub fn total_nodes(&self) -> usize {
        self.partitions.values().map(|p| p.len()).sum()
    }

    /// Get total number of edges
    pub fn total_edges(&self) -> usize {
        self.relations.values().map(|b| b.len()).sum()
    }

    /// Build the per-type `name -> id` map
    pub fn name_map(&self) -> NameMap {
        self.partitions
            .iter()
            .map(|(node_type, partition)| {
                let names = partition
                    .iter()
                    .map(|node| (node.name.to_string(), node.id))
                    .collect();
                (node_type.clone(), names)
            })
            .collect()
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            total_nodes: self.total_nodes(),
            total_edges: self.total_edges(),
            nodes_by_type: self
                .partitions
                .iter()
                .map(|(t, p)| (t.to_string(), p.len()))
                .collect(),
            edges_by_relation: self
                .relations
                .iter()
                .map(|(r, b)| (r.to_string(), b.len()))
                .collect(),
        }
    }

    /// Global CSR topology, built on first call
    pub fn topology(&self) -> &Topology {
        self.topology.get_or_init(|| Topology::build(self))
    }

    /// Outgoing neighbors of a node as `(bucket, target id)` pairs, in CSR order
    pub fn outgoing(&self, node_type: &NodeType, id: LocalId) -> Vec<(&CanonicalRelation, LocalId)> {
        self.adjacent(node_type, id, true)
    }

    /// Incoming neighbors of a node as `(bucket, source id)` pairs, in CSR order
    pub fn incoming(&self, node_type: &NodeType, id: LocalId) -> Vec<(&CanonicalRelation, LocalId)> {
        self.adjacent(node_type, id, false)
    }

    fn adjacent(
        &self,
        node_type: &NodeType,
        id: LocalId,
        outgoing: bool,
    ) -> Vec<(&CanonicalRelation, LocalId)> {
        let Some(type_index) = self.partition_index(node_type) else {
            return Vec::new();
        };
        if !self.partitions[type_index].contains_id(id) {
            return Vec::new();
        }
        let topology = self.topology();
        let global = topology.global_index(type_index, id);
        let (neighbors, edges) = if outgoing {
            (topology.view.successors(global), topology.view.outgoing_edges(global))
        } else {
            (topology.view.predecessors(global), topology.view.incoming_edges(global))
        };
        neighbors
            .iter()
            .zip(edges)
            .map(|(&neighbor, &edge)| {
                let (relation_index, _) = topology.locate_edge(edge);
                let (_, local) = topology.locate(neighbor);
                (self.relations.get_index(relation_index).map(|(r, _)| r), local)
            })
            .filter_map(|(relation, local)| relation.map(|r| (r, local)))
            .collect()
    }
}
