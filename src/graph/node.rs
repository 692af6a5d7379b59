//! Per-type node partition
//!
//! Each node type owns a dense array of names indexed by [`LocalId`] plus the reverse
//! name -> id index. Ids are handed out in first-seen order starting at 0.

use super::types::LocalId;
use rustc_hash::FxHashMap;

/// A borrowed view of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef<'a> {
    /// Local id within the node's type
    pub id: LocalId,
    /// Name (unique within the type)
    pub name: &'a str,
}

/// All nodes of a single type
#[derive(Debug, Clone, Default)]
pub struct NodePartition {
    /// Names indexed by local id
    names: Vec<String>,
    /// Reverse index: name -> local id
    index: FxHashMap<String, LocalId>,
}

impl NodePartition {
    /// Create an empty partition
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name`, allocating the next id if it has not been seen before
    pub fn get_or_insert(&mut self, name: &str) -> LocalId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len() as LocalId;
        self.index.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    /// Look up a node id by name
    pub fn id_of(&self, name: &str) -> Option<LocalId> {
        self.index.get(name).copied()
    }

    /// Look up a node name by id
    pub fn name_of(&self, id: LocalId) -> Option<&str> {
        self.names.get(id as usize).map(|s| s.as_str())
    }

    pub fn contains_id(&self, id: LocalId) -> bool {
        (id as usize) < self.names.len()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Nodes in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.names.iter().enumerate().map(|(idx, name)| NodeRef {
            id: idx as LocalId,
            name: name.as_str(),
        })
    }

    /// Names in ascending id order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
