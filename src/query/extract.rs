//! Neighborhood extraction
//!
//! The node universe is the union of the outward and inward `depth`-hop sets around the
//! seeds, walked across every relation at once. The result is the induced subgraph over
//! that universe, relabelled into a compact per-type id space.

use super::connectivity::{analyze, ConnectivityReport};
use super::seeds::{ResolvedSeeds, SeedSet};
use super::QueryResult;
use crate::graph::{LocalId, NodeType, TypedGraph};
use hetkg_graph_algorithms::{k_hop_bidirectional, EdgeIndex, NodeIndex};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Compact <-> original id mapping for one node type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRemap {
    to_original: Vec<LocalId>,
    to_compact: FxHashMap<LocalId, LocalId>,
}

impl TypeRemap {
    fn push(&mut self, original: LocalId) -> LocalId {
        let compact = self.to_original.len() as LocalId;
        self.to_original.push(original);
        self.to_compact.insert(original, compact);
        compact
    }

    pub fn original(&self, compact: LocalId) -> Option<LocalId> {
        self.to_original.get(compact as usize).copied()
    }

    pub fn compact(&self, original: LocalId) -> Option<LocalId> {
        self.to_compact.get(&original).copied()
    }

    pub fn len(&self) -> usize {
        self.to_original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_original.is_empty()
    }

    /// `(compact, original)` pairs in compact order
    pub fn iter(&self) -> impl Iterator<Item = (LocalId, LocalId)> + '_ {
        self.to_original
            .iter()
            .enumerate()
            .map(|(compact, &original)| (compact as LocalId, original))
    }
}

/// Per-type bijection between a subgraph's compact ids and the source graph's ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRemap {
    types: IndexMap<NodeType, TypeRemap>,
}

impl IdRemap {
    pub fn for_type(&self, node_type: &NodeType) -> Option<&TypeRemap> {
        self.types.get(node_type)
    }

    pub fn to_original(&self, node_type: &NodeType, compact: LocalId) -> Option<LocalId> {
        self.types.get(node_type)?.original(compact)
    }

    pub fn to_compact(&self, node_type: &NodeType, original: LocalId) -> Option<LocalId> {
        self.types.get(node_type)?.compact(original)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeType, &TypeRemap)> {
        self.types.iter()
    }
}

/// A freshly built induced subgraph together with its id mapping
#[derive(Debug, Clone)]
pub struct Subgraph {
    graph: TypedGraph,
    remap: IdRemap,
}

impl Subgraph {
    pub fn graph(&self) -> &TypedGraph {
        &self.graph
    }

    pub fn remap(&self) -> &IdRemap {
        &self.remap
    }

    pub fn into_parts(self) -> (TypedGraph, IdRemap) {
        (self.graph, self.remap)
    }
}

/// Output of [`extract`]
#[derive(Debug, Clone)]
pub struct Extraction {
    pub subgraph: Subgraph,
    pub seeds: ResolvedSeeds,
    /// Computed on the source graph, so counts are global degrees
    pub connectivity: ConnectivityReport,
}

/// Resolve `seeds`, analyze their connectivity and extract their `depth`-hop neighborhood
pub fn extract(graph: &TypedGraph, seeds: &SeedSet, depth: usize) -> QueryResult<Extraction> {
    let resolved = seeds.resolve(graph)?;
    let connectivity = analyze(graph, &resolved);
    let subgraph = neighborhood(graph, &resolved, depth)?;
    Ok(Extraction {
        subgraph,
        seeds: resolved,
        connectivity,
    })
}

/// Induced subgraph over the bidirectional `depth`-hop universe of already resolved seeds
pub fn neighborhood(graph: &TypedGraph, seeds: &ResolvedSeeds, depth: usize) -> QueryResult<Subgraph> {
    let topology = graph.topology();

    let mut sources = Vec::with_capacity(seeds.len());
    for (node_type, resolved) in seeds.iter() {
        let Some(type_index) = graph.partition_index(node_type) else {
            continue;
        };
        sources.extend(
            resolved
                .iter()
                .map(|seed| topology.global_index(type_index, seed.id)),
        );
    }
    if sources.is_empty() {
        debug!("No seeds resolved, neighborhood is empty");
    }

    let universe = k_hop_bidirectional(topology.view(), &sources, depth);
    debug!(
        "Neighborhood of {} seeds at depth {}: {} nodes",
        sources.len(),
        depth,
        universe.len()
    );
    induced_subgraph(graph, &universe)
}

/// Materialize the subgraph induced by `universe` (sorted global node indices)
///
/// Compact ids follow ascending original id per type. Edge buckets keep the source graph's
/// order, and edges inside a bucket keep their original relative order.
pub fn induced_subgraph(graph: &TypedGraph, universe: &[NodeIndex]) -> QueryResult<Subgraph> {
    let topology = graph.topology();
    let mut sub = TypedGraph::new();
    let mut remap = IdRemap::default();

    for node_type in graph.node_types() {
        sub.add_node_type(node_type);
        remap.types.insert(node_type.clone(), TypeRemap::default());
    }
    for (relation, _) in graph.relations() {
        sub.add_relation(relation);
    }

    for &idx in universe {
        let (type_index, original) = topology.locate(idx);
        let Some((node_type, partition)) = graph.partition_at(type_index) else {
            continue;
        };
        let Some(name) = partition.name_of(original) else {
            continue;
        };
        let compact = sub.add_node(node_type, name);
        let pushed = remap.types[type_index].push(original);
        debug_assert_eq!(compact, pushed);
    }

    // Every edge has exactly one source, so scanning outgoing edges of the universe
    // visits each induced edge once.
    let view = topology.view();
    let mut kept: Vec<EdgeIndex> = Vec::new();
    for &idx in universe {
        for (&target, &edge) in view.successors(idx).iter().zip(view.outgoing_edges(idx)) {
            let (target_type, target_id) = topology.locate(target);
            if remap.types[target_type].compact(target_id).is_some() {
                kept.push(edge);
            }
        }
    }
    kept.sort_unstable();

    for edge in kept {
        let (relation_index, position) = topology.locate_edge(edge);
        let Some((relation, bucket)) = graph.relation_at(relation_index) else {
            continue;
        };
        let Some(edge) = bucket.get(position) else {
            continue;
        };
        let (Some(source), Some(target)) = (
            remap.to_compact(&relation.source, edge.source),
            remap.to_compact(&relation.target, edge.target),
        ) else {
            continue;
        };
        sub.add_edge(relation, source, target)?;
    }

    Ok(Subgraph { graph: sub, remap })
}
