//! Canonical records and the published dataset snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// One collection bin. `address` is never blank once a record reaches a
/// [`Dataset`]; either coordinate may be unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, with = "coordinate_text")]
    pub latitude: Option<f64>,
    #[serde(default, with = "coordinate_text")]
    pub longitude: Option<f64>,
    pub address: String,
}

impl Record {
    pub fn new(latitude: Option<f64>, longitude: Option<f64>, address: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Decimal text of a coordinate. Integral values keep a trailing `.0`
/// (`127.0`, not `127`) so the served shape does not depend on the value.
pub fn format_coordinate(value: f64) -> String {
    format!("{value:?}")
}

/// Coordinates travel as decimal strings (`"37.4566"`) or `null`. Numbers
/// are accepted on the way in as well.
mod coordinate_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&super::format_coordinate(*v)),
            None => serializer.serialize_none(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCoordinate {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawCoordinate>::deserialize(deserializer)?;
        Ok(match raw {
            None => None,
            Some(RawCoordinate::Number(v)) => Some(v),
            Some(RawCoordinate::Text(text)) => crate::coords::parse_coordinate(&text),
        })
    }
}

/// Ordered, append-only while it is being built; read-only once published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

/// Single-writer, many-reader holder for the current [`Dataset`].
///
/// Readers clone the `Arc` and scan without holding the lock; a reload
/// builds its replacement completely before [`SharedDataset::publish`]
/// swaps the pointer.
#[derive(Debug, Default)]
pub struct SharedDataset {
    current: RwLock<Arc<Dataset>>,
}

impl SharedDataset {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<Dataset>, QueryError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| QueryError("dataset lock poisoned".to_string()))
    }

    /// Replaces the published dataset, returning the one it displaced.
    pub fn publish(&self, dataset: Dataset) -> Arc<Dataset> {
        let replacement = Arc::new(dataset);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, replacement)
    }
}
