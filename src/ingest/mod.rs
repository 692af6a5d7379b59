//! Ingestion of raw tab-separated triples into a [`TypedGraph`](crate::graph::TypedGraph)
//!
//! Input lines carry five fields: `head_type, tail_type, head_name, relation, tail_name`.
//! A malformed line aborts the whole build.

pub mod builder;
pub mod record;

pub use builder::GraphBuilder;
pub use record::{simplify_relation, Record, METABOLITE_RELATION};

use std::io;
use thiserror::Error;

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record with fewer than five tab-separated fields
    #[error("Malformed record at line {line}: expected 5 tab-separated fields, found {fields}")]
    MalformedRecord { line: usize, fields: usize },

    #[error("Invalid UTF-8 at line {line}")]
    InvalidEncoding { line: usize },
}

pub type IngestResult<T> = Result<T, IngestError>;
