//! Neighborhood query pipeline
//!
//! A query runs in four stages against a read-only [`TypedGraph`]:
//! - seed resolution: names to ids, failing on the first unknown name
//! - connectivity analysis of every seed on the source graph
//! - extraction of the bidirectional k-hop induced subgraph
//! - display selection under per-type quotas, plus the unlimited report

pub mod connectivity;
pub mod display;
pub mod extract;
pub mod report;
pub mod seeds;

pub use connectivity::{analyze, degree_summary, ConnectivityReport, NodeDegree, SeedConnectivity};
pub use display::{select, DisplayEdge, DisplayGraph, DisplayNode, DisplayQuota, MustShowSet, Quota};
pub use extract::{extract, induced_subgraph, neighborhood, Extraction, IdRemap, Subgraph, TypeRemap};
pub use report::{Report, Triple, ENTITIES_FILE, TRIPLES_FILE};
pub use seeds::{parse_names, ResolvedSeed, ResolvedSeeds, SeedSet};

use crate::graph::{GraphError, NodeType, TypedGraph};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Deepest neighborhood a query may ask for unless the engine is configured otherwise
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Query errors
#[derive(Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("Seed {name} not found among {node_type} nodes")]
    UnresolvedSeed { node_type: NodeType, name: String },

    #[error("Invalid display quota: {0} (expected a positive count or -1 for unlimited)")]
    InvalidQuota(String),

    #[error("Depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("Invalid seed specification: {0} (expected type=name1,name2)")]
    InvalidSeedSpec(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Everything a neighborhood query needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub seeds: SeedSet,
    pub depth: usize,
    #[serde(default)]
    pub quota: DisplayQuota,
}

impl QueryRequest {
    pub fn new(seeds: SeedSet, depth: usize) -> Self {
        Self {
            seeds,
            depth,
            quota: DisplayQuota::default(),
        }
    }

    pub fn with_quota(mut self, quota: DisplayQuota) -> Self {
        self.quota = quota;
        self
    }
}

/// Result of one query
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub subgraph: Subgraph,
    pub seeds: ResolvedSeeds,
    pub connectivity: ConnectivityReport,
    pub display: DisplayGraph,
    pub report: Report,
}

/// Runs neighborhood queries. Holds no graph state; one engine can serve many graphs and
/// many threads.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine {
    max_depth: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    /// Create a new query engine
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Execute a query against `graph`
    pub fn execute(&self, request: &QueryRequest, graph: &TypedGraph) -> QueryResult<QueryOutcome> {
        if request.depth > self.max_depth {
            return Err(QueryError::DepthExceeded {
                depth: request.depth,
                max: self.max_depth,
            });
        }
        let started = Instant::now();

        let Extraction {
            subgraph,
            seeds,
            connectivity,
        } = extract(graph, &request.seeds, request.depth)?;

        let must_show = MustShowSet::from(&seeds);
        let display_graph = select(&subgraph, &request.quota, &must_show);
        let report = Report::from_subgraph(&subgraph);

        info!(
            "Query over {} seeds at depth {}: {} nodes, {} edges ({} nodes, {} edges shown) in {:?}",
            seeds.len(),
            request.depth,
            subgraph.graph().total_nodes(),
            subgraph.graph().total_edges(),
            display_graph.nodes.len(),
            display_graph.edges.len(),
            started.elapsed()
        );

        Ok(QueryOutcome {
            subgraph,
            seeds,
            connectivity,
            display: display_graph,
            report,
        })
    }
}
