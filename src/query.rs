//! Read-only filtering over the published dataset.

use std::sync::Arc;

use log::debug;

use crate::{
    config::{BoundingBox, FallbackPolicy},
    coords,
    dataset::{Record, SharedDataset},
    error::QueryError,
};

/// Optional filters of one request. Blank strings count as omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinQuery {
    pub text: Option<String>,
    pub district: Option<String>,
}

impl BinQuery {
    pub fn new(text: Option<&str>, district: Option<&str>) -> Self {
        let normalize = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            text: normalize(text),
            district: normalize(district),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    dataset: Arc<SharedDataset>,
    bounding_box: BoundingBox,
    fallback: Option<FallbackPolicy>,
}

impl QueryEngine {
    pub fn new(
        dataset: Arc<SharedDataset>,
        bounding_box: BoundingBox,
        fallback: Option<FallbackPolicy>,
    ) -> Self {
        Self {
            dataset,
            bounding_box,
            fallback,
        }
    }

    /// Filters the current snapshot. The result keeps dataset order and is a
    /// fresh vector; the dataset itself is never touched.
    pub fn query(&self, query: &BinQuery) -> Result<Vec<Record>, QueryError> {
        let snapshot = self.dataset.snapshot()?;
        debug!(
            "Query text={:?} district={:?} over {} record(s)",
            query.text,
            query.district,
            snapshot.len()
        );
        let mut results = match query.district.as_deref() {
            Some(district) => self.filter_district(snapshot.records(), district),
            None => snapshot.records().to_vec(),
        };
        if let Some(text) = query.text.as_deref() {
            let needle = text.to_lowercase();
            results.retain(|record| contains_ignore_case(&record.address, &needle));
        }
        debug!("Query matched {} record(s)", results.len());
        Ok(results)
    }

    fn filter_district(&self, records: &[Record], district: &str) -> Vec<Record> {
        let needle = district.to_lowercase();
        let mut matched = records
            .iter()
            .filter(|record| contains_ignore_case(&record.address, &needle))
            .cloned()
            .collect::<Vec<_>>();

        let Some(fallback) = self.fallback.as_ref().filter(|f| f.district == district) else {
            return matched;
        };
        let before = matched.len();
        matched.retain(|record| {
            coords::is_plausible(record.latitude, record.longitude, &self.bounding_box)
        });
        debug!(
            "{} screening kept {} of {} record(s)",
            fallback.district,
            matched.len(),
            before
        );
        if matched.is_empty() {
            debug!("No usable points for {}; serving placeholder", fallback.district);
            matched.push(fallback.placeholder.clone());
        }
        matched
    }
}
