//! I/O utilities for source discovery, strict decoding, and CSV parsing.
//!
//! All file access in bin-atlas flows through this module. It provides:
//!
//! - **Discovery**: extension-filtered, name-sorted listing of a data directory.
//! - **Strict decoding**: `encoding_rs` decoding that refuses malformed input
//!   instead of substituting replacement characters.
//! - **Table parsing**: a non-flexible `csv` reader, so any ragged row rejects
//!   the whole decode attempt.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;

use crate::error::IngestError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';

/// A decoded, rectangular CSV table. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(|s| s.as_str())
    }

    /// First `limit` values of a column.
    pub fn sample(&self, column: usize, limit: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .take(limit)
            .filter_map(move |cells| cells.get(column).map(|s| s.as_str()))
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

/// Decodes `bytes` with `encoding`, stripping a BOM that belongs to it.
/// Any malformed sequence is an error.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Parses decoded text into a rectangular table. The first record is the header row.
pub fn parse_table(text: &str, delimiter: u8) -> Result<RawTable> {
    let mut reader = open_csv_reader(text.as_bytes(), delimiter, true);
    let headers = reader
        .headers()
        .context("Reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(anyhow!("No columns to parse"));
    }
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(RawTable { headers, rows })
}

pub fn read_source(path: &Path) -> Result<Vec<u8>, IngestError> {
    fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Lists files directly under `dir` accepted by `accept`, sorted by file name
/// so that repeated runs see the same discovery order.
pub fn discover_sources<F>(dir: &Path, accept: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Listing data directory {dir:?}"))? {
        let entry = entry.with_context(|| format!("Reading entry in {dir:?}"))?;
        let path = entry.path();
        if path.is_file() && accept(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
