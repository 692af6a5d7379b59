//! Core type definitions for the typed graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense per-type node identifier. Unique only within its [`NodeType`].
pub type LocalId = u32;

/// Node type tag partitioning the node namespace (e.g., "protein", "compound")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeType(String);

impl NodeType {
    pub fn new(node_type: impl Into<String>) -> Self {
        NodeType(node_type.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        NodeType(s)
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        NodeType(s.to_string())
    }
}

/// Relation label carried by an edge (raw, or simplified at ingestion)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Relation(String);

impl Relation {
    pub fn new(relation: impl Into<String>) -> Self {
        Relation(relation.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Relation {
    fn from(s: String) -> Self {
        Relation(s)
    }
}

impl From<&str> for Relation {
    fn from(s: &str) -> Self {
        Relation(s.to_string())
    }
}

/// Canonical relation triple `(source type, relation, target type)` identifying an edge bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CanonicalRelation {
    pub source: NodeType,
    pub relation: Relation,
    pub target: NodeType,
}

impl CanonicalRelation {
    pub fn new(
        source: impl Into<NodeType>,
        relation: impl Into<Relation>,
        target: impl Into<NodeType>,
    ) -> Self {
        CanonicalRelation {
            source: source.into(),
            relation: relation.into(),
            target: target.into(),
        }
    }

    /// True if `node_type` is either endpoint type
    pub fn touches(&self, node_type: &NodeType) -> bool {
        &self.source == node_type || &self.target == node_type
    }
}

impl fmt::Display for CanonicalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.relation, self.target)
    }
}
