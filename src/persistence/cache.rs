//! Built-graph cache
//!
//! Two files live in the cache directory:
//! - `node_map.json`: `{type: {name: id}}`
//! - `graph.bin`: gzip-compressed bincode snapshot of the node counts and edge buckets
//!
//! The name map is written first and the snapshot second. The snapshot embeds the SHA-256 of
//! the exact name-map bytes it was written with, so a crash between the two writes, or any
//! later tampering, shows up as a mismatch on load instead of silently pairing the wrong files.

use crate::graph::{CanonicalRelation, EdgeBucket, LocalId, NameMap, NodeType, TypedGraph};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

pub const GRAPH_FILE: &str = "graph.bin";
pub const NAME_MAP_FILE: &str = "node_map.json";

const FORMAT_VERSION: u32 = 1;

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The two cache files do not describe the same graph
    #[error("Cache mismatch: {0}")]
    Mismatch(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

fn mismatch(reason: impl Into<String>) -> CacheError {
    CacheError::Mismatch(reason.into())
}

/// On-disk snapshot
#[derive(Debug, Serialize, Deserialize)]
struct StoredGraph {
    version: u32,
    name_map_digest: [u8; 32],
    node_counts: Vec<(NodeType, u32)>,
    buckets: Vec<StoredBucket>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBucket {
    relation: CanonicalRelation,
    src: Vec<LocalId>,
    dst: Vec<LocalId>,
}

impl StoredGraph {
    fn from_graph(graph: &TypedGraph, name_map_digest: [u8; 32]) -> Self {
        StoredGraph {
            version: FORMAT_VERSION,
            name_map_digest,
            node_counts: graph
                .partitions()
                .map(|(t, p)| (t.clone(), p.len() as u32))
                .collect(),
            buckets: graph
                .relations()
                .map(|(relation, bucket)| StoredBucket {
                    relation: relation.clone(),
                    src: bucket.sources().to_vec(),
                    dst: bucket.targets().to_vec(),
                })
                .collect(),
        }
    }
}

/// Cache of a built graph in one directory
#[derive(Debug, Clone)]
pub struct GraphCache {
    dir: PathBuf,
}

impl GraphCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(GRAPH_FILE)
    }

    pub fn name_map_path(&self) -> PathBuf {
        self.dir.join(NAME_MAP_FILE)
    }

    /// True when both cache files are present
    pub fn exists(&self) -> bool {
        self.graph_path().exists() && self.name_map_path().exists()
    }

    /// Write `graph` to the cache, replacing any previous contents
    pub fn save(&self, graph: &TypedGraph) -> CacheResult<()> {
        fs::create_dir_all(&self.dir)?;

        let name_map = serde_json::to_vec(&graph.name_map())?;
        let digest: [u8; 32] = Sha256::digest(&name_map).into();
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&name_map)?;
        tmp.flush()?;
        tmp.persist(self.name_map_path()).map_err(|e| e.error)?;

        let stored = StoredGraph::from_graph(graph, digest);
        let tmp = NamedTempFile::new_in(&self.dir)?;
        let mut encoder = GzEncoder::new(BufWriter::new(tmp), Compression::default());
        bincode::serialize_into(&mut encoder, &stored)?;
        let tmp = encoder
            .finish()?
            .into_inner()
            .map_err(|e| e.into_error())?;
        tmp.persist(self.graph_path()).map_err(|e| e.error)?;

        info!(
            "Cached graph in {:?}: {} node types, {} edge types",
            self.dir,
            stored.node_counts.len(),
            stored.buckets.len()
        );
        Ok(())
    }

    /// Load the cached graph
    ///
    /// Returns `Ok(None)` when neither file exists. A lone file or any inconsistency between
    /// the two is a [`CacheError::Mismatch`].
    pub fn load(&self) -> CacheResult<Option<TypedGraph>> {
        let graph_path = self.graph_path();
        let name_map_path = self.name_map_path();
        match (graph_path.exists(), name_map_path.exists()) {
            (false, false) => return Ok(None),
            (true, false) => return Err(mismatch("graph snapshot without name map")),
            (false, true) => return Err(mismatch("name map without graph snapshot")),
            (true, true) => {}
        }

        let name_map_bytes = fs::read(&name_map_path)?;
        let decoder = GzDecoder::new(BufReader::new(File::open(&graph_path)?));
        let stored: StoredGraph = bincode::deserialize_from(decoder)
            .map_err(|e| mismatch(format!("undecodable snapshot: {}", e)))?;

        if stored.version != FORMAT_VERSION {
            return Err(mismatch(format!(
                "unsupported snapshot version {}",
                stored.version
            )));
        }
        let digest: [u8; 32] = Sha256::digest(&name_map_bytes).into();
        if digest != stored.name_map_digest {
            return Err(mismatch("name map digest does not match snapshot"));
        }
        let name_map: NameMap = serde_json::from_slice(&name_map_bytes)
            .map_err(|e| mismatch(format!("undecodable name map: {}", e)))?;

        let graph = rebuild(&stored, &name_map)?;
        debug!(
            "Loaded cached graph: {} nodes, {} edges",
            graph.total_nodes(),
            graph.total_edges()
        );
        Ok(Some(graph))
    }

    /// Remove both cache files if present
    pub fn clear(&self) -> CacheResult<()> {
        for path in [self.graph_path(), self.name_map_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Names of one type ordered by id; ids must be exactly `0..count`
fn dense_names(
    node_type: &NodeType,
    names: &IndexMap<String, LocalId>,
    count: u32,
) -> CacheResult<Vec<String>> {
    if names.len() != count as usize {
        return Err(mismatch(format!(
            "{} has {} names but the snapshot records {} nodes",
            node_type,
            names.len(),
            count
        )));
    }
    let mut ordered: Vec<Option<&str>> = vec![None; names.len()];
    for (name, &id) in names {
        let Some(slot) = ordered.get_mut(id as usize) else {
            return Err(mismatch(format!("{} id {} is out of range", node_type, id)));
        };
        if slot.is_some() {
            return Err(mismatch(format!("{} id {} is assigned twice", node_type, id)));
        }
        *slot = Some(name.as_str());
    }
    // every slot is filled: the map has `count` distinct in-range ids
    Ok(ordered.into_iter().flatten().map(str::to_string).collect())
}

fn rebuild(stored: &StoredGraph, name_map: &NameMap) -> CacheResult<TypedGraph> {
    if stored.node_counts.len() != name_map.len() {
        return Err(mismatch(format!(
            "snapshot has {} node types, name map has {}",
            stored.node_counts.len(),
            name_map.len()
        )));
    }

    let mut graph = TypedGraph::new();
    for (node_type, count) in &stored.node_counts {
        let names = name_map
            .get(node_type)
            .ok_or_else(|| mismatch(format!("node type {} missing from name map", node_type)))?;
        graph.add_node_type(node_type);
        for name in dense_names(node_type, names, *count)? {
            graph.add_node(node_type, &name);
        }
    }

    for stored_bucket in &stored.buckets {
        let bucket = EdgeBucket::from_columns(stored_bucket.src.clone(), stored_bucket.dst.clone())
            .ok_or_else(|| mismatch(format!("ragged bucket {}", stored_bucket.relation)))?;
        graph
            .add_bucket(stored_bucket.relation.clone(), bucket)
            .map_err(|e| mismatch(e.to_string()))?;
    }
    Ok(graph)
}
