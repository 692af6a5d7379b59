//! Seed sets: the entities a neighborhood query is centred on

use super::{QueryError, QueryResult};
use crate::graph::{LocalId, NodeType, TypedGraph};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Split a raw comma-separated field into trimmed, non-empty names
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Requested seed names per node type, in request order and free of duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<NodeType, Vec<String>>",
    into = "IndexMap<NodeType, Vec<String>>"
)]
pub struct SeedSet {
    seeds: IndexMap<NodeType, Vec<String>>,
}

impl From<IndexMap<NodeType, Vec<String>>> for SeedSet {
    fn from(raw: IndexMap<NodeType, Vec<String>>) -> Self {
        let mut seeds = SeedSet::new();
        for (node_type, names) in raw {
            seeds.insert_all(node_type, names);
        }
        seeds
    }
}

impl From<SeedSet> for IndexMap<NodeType, Vec<String>> {
    fn from(seeds: SeedSet) -> Self {
        seeds.seeds
    }
}

impl SeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert_all`](Self::insert_all)
    pub fn with<I, S>(mut self, node_type: impl Into<NodeType>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_all(node_type, names);
        self
    }

    /// Add one seed; returns false if it was already present
    pub fn insert(&mut self, node_type: impl Into<NodeType>, name: impl Into<String>) -> bool {
        let name = name.into();
        let names = self.seeds.entry(node_type.into()).or_default();
        if names.contains(&name) {
            return false;
        }
        names.push(name);
        true
    }

    pub fn insert_all<I, S>(&mut self, node_type: impl Into<NodeType>, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let node_type = node_type.into();
        for name in names {
            self.insert(node_type.clone(), name);
        }
    }

    /// Add every name of a raw comma-separated field (e.g. `"P50416, P05091"`)
    pub fn insert_field(&mut self, node_type: impl Into<NodeType>, raw: &str) {
        self.insert_all(node_type, parse_names(raw));
    }

    /// Parse a `type=name1,name2` specification
    pub fn insert_spec(&mut self, spec: &str) -> QueryResult<()> {
        let (node_type, raw) = spec
            .split_once('=')
            .ok_or_else(|| QueryError::InvalidSeedSpec(spec.to_string()))?;
        let node_type = node_type.trim();
        if node_type.is_empty() {
            return Err(QueryError::InvalidSeedSpec(spec.to_string()));
        }
        self.insert_field(node_type, raw);
        Ok(())
    }

    /// Total number of requested names
    pub fn len(&self) -> usize {
        self.seeds.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeType, &[String])> {
        self.seeds.iter().map(|(t, names)| (t, names.as_slice()))
    }

    /// Resolve every name to its id. The first name missing from its stated type fails the
    /// whole resolution.
    pub fn resolve(&self, graph: &TypedGraph) -> QueryResult<ResolvedSeeds> {
        let mut resolved = IndexMap::with_capacity(self.seeds.len());
        for (node_type, names) in &self.seeds {
            if names.is_empty() {
                continue;
            }
            let mut ids = Vec::with_capacity(names.len());
            for name in names {
                let id = graph
                    .node_id(node_type, name)
                    .ok_or_else(|| QueryError::UnresolvedSeed {
                        node_type: node_type.clone(),
                        name: name.clone(),
                    })?;
                ids.push(ResolvedSeed {
                    id,
                    name: name.clone(),
                });
            }
            resolved.insert(node_type.clone(), ids);
        }
        Ok(ResolvedSeeds { seeds: resolved })
    }
}

/// A seed with its id in the source graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSeed {
    pub id: LocalId,
    pub name: String,
}

/// Seeds resolved against a graph, grouped by type in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSeeds {
    seeds: IndexMap<NodeType, Vec<ResolvedSeed>>,
}

impl ResolvedSeeds {
    pub fn iter(&self) -> impl Iterator<Item = (&NodeType, &[ResolvedSeed])> {
        self.seeds.iter().map(|(t, seeds)| (t, seeds.as_slice()))
    }

    /// Ids of one type
    pub fn ids(&self, node_type: &NodeType) -> Vec<LocalId> {
        self.seeds
            .get(node_type)
            .map(|seeds| seeds.iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.seeds.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
