//! Subgraph report: every entity and every triple of an extraction, independent of display
//! limits.

use super::extract::Subgraph;
use crate::graph::{NodeType, TypedGraph};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub const ENTITIES_FILE: &str = "entities.json";
pub const TRIPLES_FILE: &str = "triples.txt";

/// One `(subject, relation, object)` edge, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

/// Entities grouped by type plus the full triple list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Names per type in compact id order; types with no nodes are left out
    pub entities: IndexMap<NodeType, Vec<String>>,
    /// Bucket order, then edge order within the bucket
    pub triples: Vec<Triple>,
}

impl Report {
    pub fn from_subgraph(subgraph: &Subgraph) -> Self {
        Self::from_graph(subgraph.graph())
    }

    pub fn from_graph(graph: &TypedGraph) -> Self {
        let entities = graph
            .partitions()
            .filter(|(_, partition)| !partition.is_empty())
            .map(|(node_type, partition)| (node_type.clone(), partition.names().to_vec()))
            .collect();

        let mut triples = Vec::with_capacity(graph.total_edges());
        for (relation, bucket) in graph.relations() {
            for edge in bucket.iter() {
                let (Some(subject), Some(object)) = (
                    graph.node_name(&relation.source, edge.source),
                    graph.node_name(&relation.target, edge.target),
                ) else {
                    continue;
                };
                triples.push(Triple {
                    subject: subject.to_string(),
                    relation: relation.relation.to_string(),
                    object: object.to_string(),
                });
            }
        }

        Report { entities, triples }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }

    /// One `subject\trelation\tobject` line per triple
    pub fn write_triples<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for triple in &self.triples {
            writeln!(writer, "{}\t{}\t{}", triple.subject, triple.relation, triple.object)?;
        }
        writer.flush()
    }

    /// `{type: [name, ...]}`
    pub fn write_entities_json<W: Write>(&self, mut writer: W) -> io::Result<()> {
        serde_json::to_writer(&mut writer, &self.entities)?;
        writer.flush()
    }

    /// Write both files under `dir`, each replaced atomically. Returns the triples path.
    pub fn save(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let entities = dir.join(ENTITIES_FILE);
        write_atomic(dir, &entities, |w| self.write_entities_json(w))?;
        let triples = dir.join(TRIPLES_FILE);
        write_atomic(dir, &triples, |w| self.write_triples(w))?;

        info!(
            "Saved report to {:?}: {} entities, {} triples",
            dir,
            self.entity_count(),
            self.triples.len()
        );
        Ok(triples)
    }
}

fn write_atomic<F>(dir: &Path, target: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> io::Result<()>,
{
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        write(&mut writer)?;
    }
    tmp.persist(target)?;
    Ok(())
}
