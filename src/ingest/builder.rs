//! Graph builder: raw records -> [`TypedGraph`]

use super::record::Record;
use super::{IngestError, IngestResult};
use crate::graph::TypedGraph;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 1_000_000;

/// Accumulates records into a graph, assigning ids per type in first-seen order
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: TypedGraph,
    simplify_relations: bool,
    records: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite relation labels to their coarse form while ingesting
    pub fn simplify_relations(mut self, simplify: bool) -> Self {
        self.simplify_relations = simplify;
        self
    }

    /// Number of records ingested so far
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Add one parsed record
    pub fn add_record(&mut self, record: &Record<'_>) {
        let relation = record.canonical_relation(self.simplify_relations);
        self.graph
            .add_named_edge(&relation, record.head_name, record.tail_name);
        self.records += 1;
    }

    /// Parse and add one line; `line_no` is 1-based and only used for error reporting
    pub fn add_line(&mut self, line_no: usize, line: &str) -> IngestResult<()> {
        let record = Record::parse(line)
            .map_err(|fields| IngestError::MalformedRecord { line: line_no, fields })?;
        self.add_record(&record);
        Ok(())
    }

    /// Consume every line of `reader`. Stops at the first malformed line.
    pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> IngestResult<usize> {
        let before = self.records;
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => IngestError::InvalidEncoding { line: idx + 1 },
                _ => IngestError::Io(e),
            })?;
            self.add_line(idx + 1, &line)?;
            if self.records % PROGRESS_INTERVAL == 0 {
                debug!("Ingested {} records", self.records);
            }
        }
        Ok(self.records - before)
    }

    /// Consume a tab-separated file
    pub fn ingest_file(&mut self, path: impl AsRef<Path>) -> IngestResult<usize> {
        let path = path.as_ref();
        info!("Ingesting triples from {:?}", path);
        let file = File::open(path)?;
        self.ingest_reader(BufReader::new(file))
    }

    /// Finish the build and hand out the read-only graph
    pub fn finish(self) -> TypedGraph {
        let stats = self.graph.statistics();
        info!(
            "Built graph from {} records: {} nodes, {} edges",
            self.records, stats.total_nodes, stats.total_edges
        );
        for (node_type, count) in &stats.nodes_by_type {
            info!("  node type {}: {}", node_type, count);
        }
        for (relation, count) in &stats.edges_by_relation {
            info!("  edge type {}: {}", relation, count);
        }
        self.graph
    }

    /// Build a graph from a file in one call
    pub fn build_from_file(path: impl AsRef<Path>, simplify_relations: bool) -> IngestResult<TypedGraph> {
        let mut builder = GraphBuilder::new().simplify_relations(simplify_relations);
        builder.ingest_file(path)?;
        Ok(builder.finish())
    }
}
