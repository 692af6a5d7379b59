//! Persistence layer
//!
//! - Built-graph cache (`node_map.json` + `graph.bin`) with mismatch detection
//! - Download of the raw archive when the triples file is missing
//! - [`GraphContext`]: load from cache, or build from triples and refresh the cache

pub mod cache;
pub mod fetch;

pub use cache::{CacheError, CacheResult, GraphCache, GRAPH_FILE, NAME_MAP_FILE};
pub use fetch::{fetch_archive, unpack_archive, FetchError, FetchResult};

use crate::config::AppConfig;
use crate::graph::TypedGraph;
use crate::ingest::{GraphBuilder, IngestError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Triples file not found: {0:?}")]
    MissingLinks(PathBuf),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Where a context's graph came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSource {
    Cache,
    Built,
}

/// A ready-to-query graph shared across threads
#[derive(Debug, Clone)]
pub struct GraphContext {
    graph: Arc<TypedGraph>,
    source: GraphSource,
}

impl GraphContext {
    pub fn new(graph: TypedGraph, source: GraphSource) -> Self {
        // derive the traversal topology once, before any reader sees the graph
        graph.topology();
        Self {
            graph: Arc::new(graph),
            source,
        }
    }

    pub fn graph(&self) -> &Arc<TypedGraph> {
        &self.graph
    }

    pub fn source(&self) -> GraphSource {
        self.source
    }

    /// Load the cached graph, or build it from the triples file and refresh the cache
    ///
    /// A cache that does not match itself is discarded and rebuilt.
    pub fn load_or_build(config: &AppConfig) -> PersistenceResult<Self> {
        let cache = GraphCache::new(&config.cache_dir);
        match cache.load() {
            Ok(Some(graph)) => {
                info!("Loaded graph from cache {:?}", cache.dir());
                return Ok(Self::new(graph, GraphSource::Cache));
            }
            Ok(None) => info!("No cached graph in {:?}", cache.dir()),
            Err(CacheError::Mismatch(reason)) => {
                warn!("Discarding inconsistent cache: {}", reason);
                cache.clear()?;
            }
            Err(e) => return Err(e.into()),
        }
        Self::rebuild(config, &cache)
    }

    /// Build from the triples file, ignoring any cache, then rewrite the cache
    pub fn build(config: &AppConfig) -> PersistenceResult<Self> {
        Self::rebuild(config, &GraphCache::new(&config.cache_dir))
    }

    fn rebuild(config: &AppConfig, cache: &GraphCache) -> PersistenceResult<Self> {
        if !config.links_path.exists() {
            return Err(PersistenceError::MissingLinks(config.links_path.clone()));
        }
        let graph = GraphBuilder::build_from_file(&config.links_path, config.simplify_relations)?;
        cache.save(&graph)?;
        Ok(Self::new(graph, GraphSource::Built))
    }

    /// [`load_or_build`](Self::load_or_build), downloading the raw archive when no usable
    /// cache exists and the triples file is missing
    pub async fn prepare(config: &AppConfig) -> PersistenceResult<Self> {
        let attempt = config.clone();
        match tokio::task::spawn_blocking(move || Self::load_or_build(&attempt)).await? {
            Err(PersistenceError::MissingLinks(path)) => {
                info!("Triples file {:?} missing, fetching the raw archive", path);
                fetch_archive(&config.archive_url, config.links_dir(), config.fetch_timeout())
                    .await?;
            }
            result => return result,
        }
        let config = config.clone();
        tokio::task::spawn_blocking(move || Self::load_or_build(&config)).await?
    }
}
