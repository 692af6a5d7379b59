use hetkg::graph::{CanonicalRelation, NodeType, TypedGraph};
use hetkg::ingest::GraphBuilder;
use hetkg::query::{
    extract, select, DisplayQuota, MustShowSet, QueryEngine, QueryError, QueryRequest, Quota,
    Report, SeedSet,
};
use std::io::Cursor;

fn build(lines: &str) -> TypedGraph {
    let mut builder = GraphBuilder::new();
    builder.ingest_reader(Cursor::new(lines)).unwrap();
    builder.finish()
}

#[test]
fn test_two_record_scenario() {
    let graph = build("A\tB\tx1\trelA\ty1\nB\tA\ty1\trelB\tx2\n");
    let seeds = SeedSet::new().with("A", ["x1"]);
    let a = NodeType::new("A");
    let b = NodeType::new("B");

    let one = extract(&graph, &seeds, 1).unwrap().subgraph;
    let names: Vec<&str> = one.graph().nodes(&a).map(|n| n.name).collect();
    assert_eq!(names, vec!["x1"]);
    assert_eq!(one.graph().num_nodes(&b), 1);
    assert_eq!(one.graph().total_edges(), 1);
    assert_eq!(
        one.graph().num_edges(&CanonicalRelation::new("A", "relA", "B")),
        1
    );

    let two = extract(&graph, &seeds, 2).unwrap().subgraph;
    let names: Vec<&str> = two.graph().nodes(&a).map(|n| n.name).collect();
    assert_eq!(names, vec!["x1", "x2"]);
    assert_eq!(two.graph().total_edges(), 2);
}

#[test]
fn test_quota_overridden_by_must_show() {
    // x1 and x2 point at y and y points at x3, so x3 is two forward hops from the seeds
    let graph = build("A\tB\tx1\tr\ty\nA\tB\tx2\tr\ty\nB\tA\ty\tr\tx3\n");
    let seeds = SeedSet::new().with("A", ["x1", "x2"]);
    let extraction = extract(&graph, &seeds, 2).unwrap();
    let a = NodeType::new("A");
    assert_eq!(extraction.subgraph.graph().num_nodes(&a), 3);

    let quota = DisplayQuota::new().with("A", Quota::Cap(1));
    let display = select(
        &extraction.subgraph,
        &quota,
        &MustShowSet::from(&extraction.seeds),
    );

    let visible: Vec<&str> = display
        .nodes
        .iter()
        .filter(|n| n.group == a)
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(visible, vec!["x1", "x2"]);
}

#[test]
fn test_lateral_edges_are_kept() {
    // seed s reaches p and q at depth 1; p -> q is lateral and must be induced
    let graph = build(
        "S\tP\ts\tto\tp\nS\tP\ts\tto\tq\nP\tP\tp\tlateral\tq\nP\tP\tq\tfar\tr\n",
    );
    let sub = extract(&graph, &SeedSet::new().with("S", ["s"]), 1)
        .unwrap()
        .subgraph;
    let lateral = CanonicalRelation::new("P", "lateral", "P");
    let far = CanonicalRelation::new("P", "far", "P");
    assert_eq!(sub.graph().num_edges(&lateral), 1);
    assert_eq!(sub.graph().num_edges(&far), 0);
    assert_eq!(sub.graph().num_nodes(&NodeType::new("P")), 2);
}

#[test]
fn test_depth_zero_keeps_only_seed_edges() {
    let graph = build("A\tA\ta\tr\tb\nA\tA\tb\tr\tc\nA\tA\ta\tr\ta\n");
    let sub = extract(&graph, &SeedSet::new().with("A", ["a", "b"]), 0)
        .unwrap()
        .subgraph;
    let a = NodeType::new("A");
    assert_eq!(sub.graph().num_nodes(&a), 2);
    // a -> b and the a -> a self-loop; b -> c leaves the seed set
    assert_eq!(sub.graph().total_edges(), 2);

    // the self-loop survives in the report but not in the display
    let report = Report::from_subgraph(&sub);
    assert_eq!(report.triples.len(), 2);
    let display = select(&sub, &DisplayQuota::new(), &MustShowSet::new());
    assert_eq!(display.edges.len(), 1);
}

#[test]
fn test_isolated_seed_appears_alone() {
    let mut graph = build("A\tB\tx\tr\ty\n");
    graph.add_node(&NodeType::new("A"), "lonely");
    let sub = extract(&graph, &SeedSet::new().with("A", ["lonely"]), 3)
        .unwrap()
        .subgraph;
    assert_eq!(sub.graph().total_nodes(), 1);
    assert_eq!(sub.graph().total_edges(), 0);
}

#[test]
fn test_empty_seed_set_is_empty_result() {
    let graph = build("A\tB\tx\tr\ty\n");
    let request = QueryRequest::new(SeedSet::new(), 2);
    let outcome = QueryEngine::new().execute(&request, &graph).unwrap();
    assert_eq!(outcome.subgraph.graph().total_nodes(), 0);
    assert!(outcome.display.nodes.is_empty());
    assert!(outcome.report.triples.is_empty());
    assert!(outcome.connectivity.is_empty());
}

#[test]
fn test_unresolved_seed_fails_whole_query() {
    let graph = build("protein\tgo\tP05091\tenables\tGO:1\n");
    let mut seeds = SeedSet::new();
    seeds.insert_field("protein", "P05091, P99999");
    let err = QueryEngine::new()
        .execute(&QueryRequest::new(seeds, 1), &graph)
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::UnresolvedSeed {
            node_type: NodeType::new("protein"),
            name: "P99999".to_string()
        }
    );
    assert!(err.to_string().contains("P99999"));
}

#[test]
fn test_connectivity_uses_global_degree() {
    let graph = build("A\tB\tx\tr\ty1\nA\tB\tx\tr\ty2\nB\tC\ty1\ts\tz\n");
    let request = QueryRequest::new(SeedSet::new().with("A", ["x"]), 0);
    let outcome = QueryEngine::new().execute(&request, &graph).unwrap();

    // depth 0 keeps only x, but the tallies count both outgoing edges
    assert_eq!(outcome.subgraph.graph().total_nodes(), 1);
    let flat = outcome.connectivity.flatten();
    assert_eq!(flat["A:x"]["B"], 2);
    assert_eq!(flat["A:x"]["(A, r, B)"], 2);
}

#[test]
fn test_simplified_relations_flow_into_report() {
    let mut builder = GraphBuilder::new().simplify_relations(true);
    builder
        .ingest_reader(Cursor::new(
            "protein\tcompound\tP1\tHAS_METABOLITE\tC1\nprotein\tgo\tP1\tenables\tGO:1\n",
        ))
        .unwrap();
    let graph = builder.finish();

    let request = QueryRequest::new(SeedSet::new().with("protein", ["P1"]), 1);
    let outcome = QueryEngine::new().execute(&request, &graph).unwrap();
    let relations: Vec<&str> = outcome
        .report
        .triples
        .iter()
        .map(|t| t.relation.as_str())
        .collect();
    assert_eq!(relations, vec!["protein_metabolite", "protein-go"]);
}
