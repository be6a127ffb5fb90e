use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while turning one source file into records.
///
/// Every variant is local to a single file (or row); the aggregator logs it
/// and moves on to the next file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no candidate encoding produced a rectangular table for {path:?} (tried {attempted})")]
    DecodeFailure { path: PathBuf, attempted: String },
    #[error("no usable address or region-code column in {path:?} (headers: {headers:?})")]
    SchemaUnresolved { path: PathBuf, headers: Vec<String> },
    #[error("row {row} has no derivable address")]
    RowExcluded { row: usize },
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Unexpected failure while filtering the published dataset.
#[derive(Debug, Error)]
#[error("query failed: {0}")]
pub struct QueryError(pub String);
