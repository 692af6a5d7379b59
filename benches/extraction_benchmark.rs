use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hetkg::graph::{CanonicalRelation, TypedGraph};
use hetkg::ingest::GraphBuilder;
use hetkg::query::{
    extract, select, DisplayQuota, MustShowSet, QueryEngine, QueryRequest, Quota, SeedSet,
};
use std::io::Cursor;

/// Proteins in a ring, each linked to a compound, a GO term and a disease
fn synthetic_graph(proteins: usize) -> TypedGraph {
    let mut graph = TypedGraph::new();
    let ppi = CanonicalRelation::new("protein", "protein-protein", "protein");
    let binds = CanonicalRelation::new("compound", "compound-protein", "protein");
    let go = CanonicalRelation::new("protein", "protein-go", "go");
    let disease = CanonicalRelation::new("disease", "disease-protein", "protein");
    for i in 0..proteins {
        let p = format!("P{}", i);
        graph.add_named_edge(&ppi, &p, &format!("P{}", (i * 7 + 1) % proteins));
        graph.add_named_edge(&binds, &format!("C{}", i % (proteins / 4 + 1)), &p);
        graph.add_named_edge(&go, &p, &format!("GO:{}", i % 50));
        graph.add_named_edge(&disease, &format!("D{}", i % 20), &p);
    }
    graph
}

/// Benchmark raw triple ingestion
fn bench_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");

    for size in [1_000, 10_000].iter() {
        let mut lines = String::new();
        for i in 0..*size {
            lines.push_str(&format!("protein\tgo\tP{}\tenables\tGO:{}\n", i, i % 100));
        }
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                let mut builder = GraphBuilder::new().simplify_relations(true);
                builder.ingest_reader(Cursor::new(lines.as_bytes())).unwrap();
                criterion::black_box(builder.finish().total_edges());
            });
        });
    }
    group.finish();
}

/// Benchmark k-hop extraction at increasing depth
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let graph = synthetic_graph(10_000);
    graph.topology();
    let seeds = SeedSet::new().with("protein", ["P0", "P1", "P2"]);

    for depth in [1, 2, 3].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter(|| {
                let extraction = extract(&graph, &seeds, depth).unwrap();
                criterion::black_box(extraction.subgraph.graph().total_nodes());
            });
        });
    }
    group.finish();
}

/// Benchmark display selection under quotas
fn bench_display(c: &mut Criterion) {
    let graph = synthetic_graph(10_000);
    let extraction = extract(&graph, &SeedSet::new().with("protein", ["P0"]), 3).unwrap();
    let must_show = MustShowSet::from(&extraction.seeds);
    let quota = DisplayQuota::uniform(["protein", "compound", "go", "disease"], Quota::Cap(10));

    c.bench_function("display_select", |b| {
        b.iter(|| {
            let display = select(&extraction.subgraph, &quota, &must_show);
            criterion::black_box(display.nodes.len());
        });
    });
}

/// Benchmark the full query pipeline
fn bench_query(c: &mut Criterion) {
    let graph = synthetic_graph(10_000);
    let engine = QueryEngine::new();
    let request = QueryRequest::new(SeedSet::new().with("protein", ["P42"]), 2);

    c.bench_function("query_pipeline", |b| {
        b.iter(|| {
            let outcome = engine.execute(&request, &graph).unwrap();
            criterion::black_box(outcome.report.triples.len());
        });
    });
}

criterion_group!(
    benches,
    bench_ingestion,
    bench_extraction,
    bench_display,
    bench_query
);
criterion_main!(benches);
