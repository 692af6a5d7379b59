//! hetkg: neighborhood queries over heterogeneous knowledge graphs
//!
//! Builds a typed multi-relational graph from tab-separated triples and answers k-hop
//! neighborhood queries around named seed entities, producing an induced subgraph, per-seed
//! connectivity statistics, a display-limited view and a full triple report.
//!
//! # Layers
//!
//! - [`graph`]: typed node partitions, canonical-relation edge buckets, CSR topology
//! - [`ingest`]: triple parsing and graph building
//! - [`query`]: seed resolution, extraction, connectivity, display selection, reporting
//! - [`persistence`]: built-graph cache and raw archive download
//! - [`config`]: YAML application configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use hetkg::graph::{CanonicalRelation, NodeType, TypedGraph};
//! use hetkg::query::{DisplayQuota, QueryEngine, QueryRequest, Quota, SeedSet};
//!
//! let mut graph = TypedGraph::new();
//! let enables = CanonicalRelation::new("protein", "protein-go", "go");
//! graph.add_named_edge(&enables, "P05091", "GO:0004029");
//! graph.add_named_edge(&enables, "P05091", "GO:0006068");
//!
//! let request = QueryRequest::new(SeedSet::new().with("protein", ["P05091"]), 1)
//!     .with_quota(DisplayQuota::new().with("go", Quota::Cap(1)));
//! let outcome = QueryEngine::new().execute(&request, &graph).unwrap();
//!
//! assert_eq!(outcome.report.triples.len(), 2);
//! assert_eq!(outcome.display.visible_ids(&NodeType::new("go")), vec![0]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod ingest;
pub mod persistence;
pub mod query;

// Re-export main types for convenience
pub use config::{AppConfig, ConfigError, ConfigResult};

pub use graph::{
    CanonicalRelation, GraphError, GraphResult, LocalId, NameMap, NodeType, Relation, TypedGraph,
};

pub use ingest::{GraphBuilder, IngestError, IngestResult};

pub use query::{
    DisplayGraph, DisplayQuota, QueryEngine, QueryError, QueryOutcome, QueryRequest, QueryResult,
    Quota, Report, SeedSet, Subgraph,
};

pub use persistence::{
    CacheError, FetchError, GraphCache, GraphContext, PersistenceError, PersistenceResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
