//! Per-seed connectivity statistics
//!
//! Counts are taken on the source graph, so they reflect global degree independent of the
//! extraction depth. Parallel edges each count once.

use super::seeds::{ResolvedSeed, ResolvedSeeds};
use super::{QueryError, QueryResult};
use crate::graph::{CanonicalRelation, LocalId, NodeType, TypedGraph};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

/// Neighbor tallies for one seed
///
/// Every bucket in which the seed's type is source or target has an entry, zero included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedConnectivity {
    /// Neighbors per neighbor type, forward and backward combined
    pub neighbors_by_type: IndexMap<NodeType, usize>,
    /// Edges per bucket, forward and backward combined
    pub edges_by_relation: IndexMap<CanonicalRelation, usize>,
}

impl SeedConnectivity {
    pub fn total_edges(&self) -> usize {
        self.edges_by_relation.values().sum()
    }

    /// Flat `label -> count` view; neighbor types first, then buckets
    pub fn flatten(&self) -> IndexMap<String, usize> {
        self.neighbors_by_type
            .iter()
            .map(|(t, &count)| (t.to_string(), count))
            .chain(
                self.edges_by_relation
                    .iter()
                    .map(|(r, &count)| (r.to_string(), count)),
            )
            .collect()
    }
}

/// Connectivity of every seed, keyed by `(type, name)` in seed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    entries: IndexMap<(NodeType, String), SeedConnectivity>,
}

impl ConnectivityReport {
    pub fn get(&self, node_type: &NodeType, name: &str) -> Option<&SeedConnectivity> {
        self.entries.get(&(node_type.clone(), name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeType, &str, &SeedConnectivity)> {
        self.entries
            .iter()
            .map(|((t, name), stats)| (t, name.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `{"type:name": {label: count}}`
    pub fn flatten(&self) -> IndexMap<String, IndexMap<String, usize>> {
        self.iter()
            .map(|(t, name, stats)| (format!("{}:{}", t, name), stats.flatten()))
            .collect()
    }
}

/// Out/in degree of a single node, broken down by bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDegree {
    pub node_type: NodeType,
    pub name: String,
    pub id: LocalId,
    pub total_out: usize,
    pub total_in: usize,
    /// Non-zero buckets only, keyed by the bucket's display form
    pub out_by_relation: IndexMap<String, usize>,
    pub in_by_relation: IndexMap<String, usize>,
}

/// Per-bucket (out, in) edge counts of one node, indexed by bucket number
fn relation_degrees(graph: &TypedGraph, type_index: usize, id: LocalId) -> (Vec<usize>, Vec<usize>) {
    let topology = graph.topology();
    let view = topology.view();
    let global = topology.global_index(type_index, id);

    let mut outgoing = vec![0usize; graph.num_relations()];
    let mut incoming = vec![0usize; graph.num_relations()];
    for &edge in view.outgoing_edges(global) {
        outgoing[topology.locate_edge(edge).0] += 1;
    }
    for &edge in view.incoming_edges(global) {
        incoming[topology.locate_edge(edge).0] += 1;
    }
    (outgoing, incoming)
}

fn seed_connectivity(
    graph: &TypedGraph,
    node_type: &NodeType,
    type_index: usize,
    id: LocalId,
) -> SeedConnectivity {
    let (outgoing, incoming) = relation_degrees(graph, type_index, id);
    let mut stats = SeedConnectivity::default();

    for (relation_index, (relation, _)) in graph.relations().enumerate() {
        if !relation.touches(node_type) {
            continue;
        }
        if &relation.source == node_type {
            let count = outgoing[relation_index];
            *stats
                .neighbors_by_type
                .entry(relation.target.clone())
                .or_insert(0) += count;
            *stats.edges_by_relation.entry(relation.clone()).or_insert(0) += count;
        }
        if &relation.target == node_type {
            let count = incoming[relation_index];
            *stats
                .neighbors_by_type
                .entry(relation.source.clone())
                .or_insert(0) += count;
            *stats.edges_by_relation.entry(relation.clone()).or_insert(0) += count;
        }
    }
    stats
}

/// Tally forward and backward neighbors of every seed
pub fn analyze(graph: &TypedGraph, seeds: &ResolvedSeeds) -> ConnectivityReport {
    // derive the topology before fanning out
    graph.topology();

    let jobs: Vec<(&NodeType, usize, &ResolvedSeed)> = seeds
        .iter()
        .filter_map(|(node_type, resolved)| {
            graph
                .partition_index(node_type)
                .map(|type_index| (node_type, type_index, resolved))
        })
        .flat_map(|(node_type, type_index, resolved)| {
            resolved.iter().map(move |seed| (node_type, type_index, seed))
        })
        .collect();

    let stats: Vec<SeedConnectivity> = jobs
        .par_iter()
        .map(|&(node_type, type_index, seed)| {
            seed_connectivity(graph, node_type, type_index, seed.id)
        })
        .collect();

    let entries = jobs
        .into_iter()
        .zip(stats)
        .map(|((node_type, _, seed), stats)| ((node_type.clone(), seed.name.clone()), stats))
        .collect();
    ConnectivityReport { entries }
}

/// Degree breakdown of one named node
pub fn degree_summary(graph: &TypedGraph, node_type: &NodeType, name: &str) -> QueryResult<NodeDegree> {
    let unresolved = || QueryError::UnresolvedSeed {
        node_type: node_type.clone(),
        name: name.to_string(),
    };
    let type_index = graph.partition_index(node_type).ok_or_else(unresolved)?;
    let id = graph.node_id(node_type, name).ok_or_else(unresolved)?;

    let topology = graph.topology();
    let global = topology.global_index(type_index, id);
    let total_out = topology.view().out_degree(global);
    let total_in = topology.view().in_degree(global);

    let (outgoing, incoming) = relation_degrees(graph, type_index, id);
    let mut out_by_relation = IndexMap::new();
    let mut in_by_relation = IndexMap::new();
    for (relation_index, (relation, _)) in graph.relations().enumerate() {
        if relation.source == *node_type && outgoing[relation_index] > 0 {
            out_by_relation.insert(relation.to_string(), outgoing[relation_index]);
        }
        if relation.target == *node_type && incoming[relation_index] > 0 {
            in_by_relation.insert(relation.to_string(), incoming[relation_index]);
        }
    }

    Ok(NodeDegree {
        node_type: node_type.clone(),
        name: name.to_string(),
        id,
        total_out,
        total_in,
        out_by_relation,
        in_by_relation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SeedSet;

    fn graph() -> TypedGraph {
        let mut graph = TypedGraph::new();
        let binds = CanonicalRelation::new("compound", "binds", "protein");
        let enables = CanonicalRelation::new("protein", "enables", "go");
        let interacts = CanonicalRelation::new("protein", "interacts", "protein");
        let causes = CanonicalRelation::new("disease", "related", "go");
        graph.add_named_edge(&binds, "C1", "P1");
        graph.add_named_edge(&binds, "C2", "P1");
        graph.add_named_edge(&binds, "C2", "P1");
        graph.add_named_edge(&enables, "P1", "GO:1");
        graph.add_named_edge(&interacts, "P1", "P2");
        graph.add_named_edge(&interacts, "P2", "P1");
        graph.add_named_edge(&causes, "D1", "GO:1");
        graph
    }

    #[test]
    fn test_analyze_counts_both_directions() {
        let graph = graph();
        let seeds = SeedSet::new().with("protein", ["P1"]).resolve(&graph).unwrap();
        let report = analyze(&graph, &seeds);
        let stats = report.get(&NodeType::new("protein"), "P1").unwrap();

        assert_eq!(stats.neighbors_by_type[&NodeType::new("compound")], 3);
        assert_eq!(stats.neighbors_by_type[&NodeType::new("go")], 1);
        // interacts is protein -> protein: one out, one in
        assert_eq!(stats.neighbors_by_type[&NodeType::new("protein")], 2);
        assert_eq!(
            stats.edges_by_relation[&CanonicalRelation::new("protein", "interacts", "protein")],
            2
        );
        assert_eq!(stats.total_edges(), 6);
        // buckets not touching protein are absent
        assert!(!stats
            .edges_by_relation
            .contains_key(&CanonicalRelation::new("disease", "related", "go")));
    }

    #[test]
    fn test_zero_entries_are_kept() {
        let graph = graph();
        let seeds = SeedSet::new().with("protein", ["P2"]).resolve(&graph).unwrap();
        let report = analyze(&graph, &seeds);
        let stats = report.get(&NodeType::new("protein"), "P2").unwrap();

        assert_eq!(stats.neighbors_by_type[&NodeType::new("compound")], 0);
        assert_eq!(stats.neighbors_by_type[&NodeType::new("go")], 0);
        assert_eq!(stats.flatten()["(compound, binds, protein)"], 0);
    }

    #[test]
    fn test_flatten_report() {
        let graph = graph();
        let seeds = SeedSet::new()
            .with("protein", ["P1"])
            .with("go", ["GO:1"])
            .resolve(&graph)
            .unwrap();
        let flat = analyze(&graph, &seeds).flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["go:GO:1"]["disease"], 1);
        assert_eq!(flat["go:GO:1"]["protein"], 1);
    }

    #[test]
    fn test_degree_summary() {
        let graph = graph();
        let degree = degree_summary(&graph, &NodeType::new("protein"), "P1").unwrap();

        assert_eq!(degree.total_out, 2);
        assert_eq!(degree.total_in, 4);
        assert_eq!(degree.out_by_relation["(protein, enables, go)"], 1);
        assert_eq!(degree.in_by_relation["(compound, binds, protein)"], 3);
        assert_eq!(degree.out_by_relation.len(), 2);

        assert!(degree_summary(&graph, &NodeType::new("protein"), "P9").is_err());
        assert!(degree_summary(&graph, &NodeType::new("gene"), "P1").is_err());
    }
}
