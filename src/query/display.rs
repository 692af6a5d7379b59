//! Display selection
//!
//! Chooses which nodes of an extracted subgraph are shown under per-type quotas. Seeds are
//! never hidden: a quota smaller than the number of must-show nodes of a type is raised to
//! cover them. Edges survive only between visible nodes, and self-loops are always dropped.

use super::extract::Subgraph;
use super::seeds::ResolvedSeeds;
use super::{QueryError, QueryResult};
use crate::graph::{LocalId, NodeType, Relation};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display cap for one node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Quota {
    Unlimited,
    Cap(usize),
}

impl TryFrom<i64> for Quota {
    type Error = QueryError;

    /// `-1` is unlimited, positive values are caps
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Quota::Unlimited),
            n if n > 0 => Ok(Quota::Cap(n as usize)),
            n => Err(QueryError::InvalidQuota(n.to_string())),
        }
    }
}

impl From<Quota> for i64 {
    fn from(quota: Quota) -> Self {
        match quota {
            Quota::Unlimited => -1,
            Quota::Cap(n) => n as i64,
        }
    }
}

impl FromStr for Quota {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("unlimited") {
            return Ok(Quota::Unlimited);
        }
        let value: i64 = s
            .parse()
            .map_err(|_| QueryError::InvalidQuota(s.to_string()))?;
        Quota::try_from(value)
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Unlimited => write!(f, "unlimited"),
            Quota::Cap(n) => write!(f, "{}", n),
        }
    }
}

/// Per-type display quotas. Types without an entry are unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayQuota {
    quotas: IndexMap<NodeType, Quota>,
}

impl DisplayQuota {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same quota for every listed type
    pub fn uniform<I, T>(node_types: I, quota: Quota) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeType>,
    {
        Self {
            quotas: node_types.into_iter().map(|t| (t.into(), quota)).collect(),
        }
    }

    pub fn with(mut self, node_type: impl Into<NodeType>, quota: Quota) -> Self {
        self.set(node_type, quota);
        self
    }

    pub fn set(&mut self, node_type: impl Into<NodeType>, quota: Quota) {
        self.quotas.insert(node_type.into(), quota);
    }

    pub fn get(&self, node_type: &NodeType) -> Quota {
        self.quotas
            .get(node_type)
            .copied()
            .unwrap_or(Quota::Unlimited)
    }

    /// Parse and apply a `type=quota` specification (`protein=10`, `go=inf`)
    pub fn insert_spec(&mut self, spec: &str) -> QueryResult<()> {
        let (node_type, quota) = spec
            .split_once('=')
            .ok_or_else(|| QueryError::InvalidQuota(spec.to_string()))?;
        self.set(node_type.trim(), quota.parse()?);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeType, Quota)> {
        self.quotas.iter().map(|(t, &q)| (t, q))
    }
}

/// Source-graph ids that must stay visible whatever the quotas say
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MustShowSet {
    nodes: IndexMap<NodeType, Vec<LocalId>>,
}

impl MustShowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_type: impl Into<NodeType>, original: LocalId) {
        let ids = self.nodes.entry(node_type.into()).or_default();
        if !ids.contains(&original) {
            ids.push(original);
        }
    }

    pub fn get(&self, node_type: &NodeType) -> &[LocalId] {
        self.nodes.get(node_type).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl From<&ResolvedSeeds> for MustShowSet {
    fn from(seeds: &ResolvedSeeds) -> Self {
        let mut must_show = MustShowSet::new();
        for (node_type, resolved) in seeds.iter() {
            for seed in resolved {
                must_show.insert(node_type.clone(), seed.id);
            }
        }
        must_show
    }
}

/// A visible node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayNode {
    /// Unique across types: `"{type}_{compact id}"`
    pub key: String,
    pub label: String,
    pub group: NodeType,
    pub id: LocalId,
}

/// A visible edge between two visible nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEdge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}

/// Display-limited view of a subgraph, ready for a renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayGraph {
    pub nodes: Vec<DisplayNode>,
    pub edges: Vec<DisplayEdge>,
}

impl DisplayGraph {
    /// Visible compact ids of one type, ascending
    pub fn visible_ids(&self, node_type: &NodeType) -> Vec<LocalId> {
        self.nodes
            .iter()
            .filter(|node| &node.group == node_type)
            .map(|node| node.id)
            .collect()
    }
}

fn node_key(node_type: &NodeType, id: LocalId) -> String {
    format!("{}_{}", node_type, id)
}

/// Visible flags for one type, indexed by compact id
fn visible_nodes(len: usize, quota: Quota, must_show: impl IntoIterator<Item = LocalId>) -> Vec<bool> {
    if quota == Quota::Unlimited {
        return vec![true; len];
    }
    let mut visible = vec![false; len];
    let mut count = 0;
    for compact in must_show {
        if let Some(flag) = visible.get_mut(compact as usize) {
            if !*flag {
                *flag = true;
                count += 1;
            }
        }
    }
    if let Quota::Cap(cap) = quota {
        for flag in visible.iter_mut() {
            if count >= cap {
                break;
            }
            if !*flag {
                *flag = true;
                count += 1;
            }
        }
    }
    visible
}

/// Pick the visible part of `subgraph`
pub fn select(subgraph: &Subgraph, quota: &DisplayQuota, must_show: &MustShowSet) -> DisplayGraph {
    let graph = subgraph.graph();
    let remap = subgraph.remap();

    let mut visible: IndexMap<&NodeType, Vec<bool>> = IndexMap::new();
    let mut nodes = Vec::new();
    for (node_type, partition) in graph.partitions() {
        let pinned = must_show
            .get(node_type)
            .iter()
            .filter_map(|&original| remap.to_compact(node_type, original));
        let flags = visible_nodes(partition.len(), quota.get(node_type), pinned);
        for node in partition.iter() {
            if flags[node.id as usize] {
                nodes.push(DisplayNode {
                    key: node_key(node_type, node.id),
                    label: node.name.to_string(),
                    group: node_type.clone(),
                    id: node.id,
                });
            }
        }
        visible.insert(node_type, flags);
    }

    let is_visible = |node_type: &NodeType, id: LocalId| {
        visible
            .get(node_type)
            .and_then(|flags| flags.get(id as usize))
            .copied()
            .unwrap_or(false)
    };

    let mut edges = Vec::new();
    for (relation, bucket) in graph.relations() {
        for edge in bucket.iter() {
            if is_visible(&relation.source, edge.source) && is_visible(&relation.target, edge.target) {
                edges.push(DisplayEdge {
                    source: node_key(&relation.source, edge.source),
                    target: node_key(&relation.target, edge.target),
                    relation: relation.relation.clone(),
                });
            }
        }
    }

    // Self-loops are a display concern only; the report keeps them.
    edges.retain(|edge| edge.source != edge.target);

    DisplayGraph { nodes, edges }
}
