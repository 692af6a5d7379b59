//! Property-based tests for neighborhood extraction and display selection.
//!
//! Random small heterogeneous graphs over three node types and two relation labels check:
//! - depth monotonicity of the node universe
//! - depth 0 and induced-subgraph completeness
//! - id remap bijection
//! - display selection guarantees (must-show, unlimited, no self-loops)
//! - report completeness

use hetkg::graph::{CanonicalRelation, NodeType, TypedGraph};
use hetkg::query::{extract, select, DisplayQuota, MustShowSet, Quota, Report, SeedSet, Subgraph};
use proptest::prelude::*;
use std::collections::BTreeSet;

const TYPES: [&str; 3] = ["A", "B", "C"];
const LABELS: [&str; 2] = ["r", "s"];

type RawEdge = (usize, usize, usize, usize, usize);

fn arb_edges() -> impl Strategy<Value = Vec<RawEdge>> {
    prop::collection::vec((0..3usize, 0..6usize, 0..2usize, 0..3usize, 0..6usize), 0..40)
}

fn arb_seeds() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..3usize, 0..6usize), 0..4)
}

fn node_name(t: usize, i: usize) -> String {
    format!("{}{}", TYPES[t].to_lowercase(), i)
}

fn build(edges: &[RawEdge]) -> TypedGraph {
    let mut graph = TypedGraph::new();
    for &(st, si, rel, dt, di) in edges {
        let relation = CanonicalRelation::new(TYPES[st], LABELS[rel], TYPES[dt]);
        graph.add_named_edge(&relation, &node_name(st, si), &node_name(dt, di));
    }
    graph
}

/// Seeds that exist in the graph
fn seed_set(graph: &TypedGraph, raw: &[(usize, usize)]) -> SeedSet {
    let mut seeds = SeedSet::new();
    for &(t, i) in raw {
        let name = node_name(t, i);
        if graph.node_id(&NodeType::new(TYPES[t]), &name).is_some() {
            seeds.insert(TYPES[t], name);
        }
    }
    seeds
}

fn universe(sub: &Subgraph) -> BTreeSet<(String, String)> {
    sub.graph()
        .partitions()
        .flat_map(|(t, p)| p.iter().map(move |n| (t.to_string(), n.name.to_string())))
        .collect()
}

/// Original edges per bucket whose endpoints both lie in `nodes`
fn induced_count(graph: &TypedGraph, relation: &CanonicalRelation, nodes: &BTreeSet<(String, String)>) -> usize {
    graph
        .edges(relation)
        .filter(|e| {
            let src = graph.node_name(&relation.source, e.source).unwrap_or_default();
            let dst = graph.node_name(&relation.target, e.target).unwrap_or_default();
            nodes.contains(&(relation.source.to_string(), src.to_string()))
                && nodes.contains(&(relation.target.to_string(), dst.to_string()))
        })
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn universe_grows_with_depth(
        edges in arb_edges(),
        raw_seeds in arb_seeds(),
        d1 in 0..3usize,
        extra in 1..3usize,
    ) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let small = universe(&extract(&graph, &seeds, d1).unwrap().subgraph);
        let large = universe(&extract(&graph, &seeds, d1 + extra).unwrap().subgraph);
        prop_assert!(small.is_subset(&large));
    }

    #[test]
    fn depth_zero_is_seeds_and_their_edges(edges in arb_edges(), raw_seeds in arb_seeds()) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let sub = extract(&graph, &seeds, 0).unwrap().subgraph;

        let expected: BTreeSet<(String, String)> = seeds
            .iter()
            .flat_map(|(t, names)| names.iter().map(move |n| (t.to_string(), n.clone())))
            .collect();
        let nodes = universe(&sub);
        prop_assert_eq!(&nodes, &expected);

        let edges_among_seeds: usize = graph
            .relations()
            .map(|(relation, _)| induced_count(&graph, relation, &expected))
            .sum();
        prop_assert_eq!(sub.graph().total_edges(), edges_among_seeds);
    }

    #[test]
    fn induced_subgraph_is_complete(
        edges in arb_edges(),
        raw_seeds in arb_seeds(),
        depth in 0..4usize,
    ) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let sub = extract(&graph, &seeds, depth).unwrap().subgraph;
        let nodes = universe(&sub);

        prop_assert_eq!(sub.graph().num_relations(), graph.num_relations());
        for (relation, _) in graph.relations() {
            prop_assert_eq!(
                sub.graph().num_edges(relation),
                induced_count(&graph, relation, &nodes),
                "bucket {}", relation
            );
        }
    }

    #[test]
    fn remap_is_a_bijection(
        edges in arb_edges(),
        raw_seeds in arb_seeds(),
        depth in 0..4usize,
    ) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let sub = extract(&graph, &seeds, depth).unwrap().subgraph;

        for (node_type, partition) in sub.graph().partitions() {
            let remap = sub.remap().for_type(node_type).unwrap();
            prop_assert_eq!(remap.len(), partition.len());
            let mut originals = BTreeSet::new();
            for node in partition.iter() {
                let original = sub.remap().to_original(node_type, node.id).unwrap();
                prop_assert!(originals.insert(original));
                prop_assert_eq!(sub.remap().to_compact(node_type, original), Some(node.id));
                prop_assert_eq!(graph.node_name(node_type, original), Some(node.name));
            }
            // compact ids follow ascending original ids
            let ordered: Vec<u32> = remap.iter().map(|(_, original)| original).collect();
            prop_assert!(ordered.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn display_respects_must_show_and_quota(
        edges in arb_edges(),
        raw_seeds in arb_seeds(),
        depth in 0..3usize,
        caps in prop::collection::vec(prop_oneof![Just(-1i64), 1..5i64], 3),
    ) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let extraction = extract(&graph, &seeds, depth).unwrap();
        let sub = &extraction.subgraph;

        let mut quota = DisplayQuota::new();
        for (t, &cap) in TYPES.iter().zip(&caps) {
            quota.set(*t, Quota::try_from(cap).unwrap());
        }
        let must_show = MustShowSet::from(&extraction.seeds);
        let display = select(sub, &quota, &must_show);

        for (node_type, partition) in sub.graph().partitions() {
            let visible: BTreeSet<u32> = display.visible_ids(node_type).into_iter().collect();
            let pinned: BTreeSet<u32> = extraction
                .seeds
                .ids(node_type)
                .into_iter()
                .filter_map(|original| sub.remap().to_compact(node_type, original))
                .collect();
            prop_assert!(pinned.is_subset(&visible));

            match quota.get(node_type) {
                Quota::Unlimited => prop_assert_eq!(visible.len(), partition.len()),
                Quota::Cap(cap) => {
                    prop_assert_eq!(visible.len(), cap.max(pinned.len()).min(partition.len()));
                }
            }
        }

        let keys: BTreeSet<&str> = display.nodes.iter().map(|n| n.key.as_str()).collect();
        for edge in &display.edges {
            prop_assert_ne!(&edge.source, &edge.target);
            prop_assert!(keys.contains(edge.source.as_str()));
            prop_assert!(keys.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn unlimited_display_shows_everything_but_self_loops(
        edges in arb_edges(),
        raw_seeds in arb_seeds(),
        depth in 0..3usize,
    ) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let sub = extract(&graph, &seeds, depth).unwrap().subgraph;
        let display = select(&sub, &DisplayQuota::new(), &MustShowSet::new());

        prop_assert_eq!(display.nodes.len(), sub.graph().total_nodes());
        let loops: usize = sub
            .graph()
            .relations()
            .filter(|(r, _)| r.source == r.target)
            .map(|(_, b)| b.iter().filter(|e| e.source == e.target).count())
            .sum();
        prop_assert_eq!(display.edges.len(), sub.graph().total_edges() - loops);
    }

    #[test]
    fn report_covers_unfiltered_subgraph(
        edges in arb_edges(),
        raw_seeds in arb_seeds(),
        depth in 0..3usize,
    ) {
        let graph = build(&edges);
        let seeds = seed_set(&graph, &raw_seeds);
        let sub = extract(&graph, &seeds, depth).unwrap().subgraph;
        let report = Report::from_subgraph(&sub);

        let per_bucket: usize = sub.graph().relations().map(|(_, b)| b.len()).sum();
        prop_assert_eq!(report.triples.len(), per_bucket);
        prop_assert_eq!(report.entity_count(), sub.graph().total_nodes());
    }
}
