//! Edge bucket for one canonical relation
//!
//! Edges are stored column-wise (COO): `src[i] -> dst[i]`, both local ids of the bucket's
//! source and target node types. Parallel edges are kept as separate entries.

use super::types::LocalId;
use serde::{Deserialize, Serialize};

/// A directed edge inside a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    /// Source node (local id in the bucket's source type)
    pub source: LocalId,
    /// Target node (local id in the bucket's target type)
    pub target: LocalId,
}

/// All edges of a single canonical relation, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBucket {
    src: Vec<LocalId>,
    dst: Vec<LocalId>,
}

impl EdgeBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a bucket from its endpoint columns
    ///
    /// Returns `None` when the columns differ in length.
    pub fn from_columns(src: Vec<LocalId>, dst: Vec<LocalId>) -> Option<Self> {
        if src.len() != dst.len() {
            return None;
        }
        Some(Self { src, dst })
    }

    pub fn push(&mut self, source: LocalId, target: LocalId) {
        self.src.push(source);
        self.dst.push(target);
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Edge at position `idx`
    pub fn get(&self, idx: usize) -> Option<EdgeRef> {
        Some(EdgeRef {
            source: *self.src.get(idx)?,
            target: *self.dst.get(idx)?,
        })
    }

    /// Edges in insertion order
    pub fn iter(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.src
            .iter()
            .zip(self.dst.iter())
            .map(|(&source, &target)| EdgeRef { source, target })
    }

    pub fn sources(&self) -> &[LocalId] {
        &self.src
    }

    pub fn targets(&self) -> &[LocalId] {
        &self.dst
    }
}
