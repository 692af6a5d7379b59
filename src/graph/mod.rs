//! Typed graph store
//!
//! This module implements the heterogeneous graph data model:
//! - Nodes partitioned by type, with dense per-type ids in first-seen order
//! - Directed edges partitioned by canonical relation `(source type, relation, target type)`
//! - Multiple edges between the same nodes are kept
//! - A derived, read-only CSR topology for traversal

pub mod edge;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::{EdgeBucket, EdgeRef};
pub use node::{NodePartition, NodeRef};
pub use store::{GraphError, GraphResult, GraphStatistics, NameMap, Topology, TypedGraph};
pub use types::{CanonicalRelation, LocalId, NodeType, Relation};
