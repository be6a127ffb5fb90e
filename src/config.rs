//! Ingestion and query configuration.
//!
//! Every field has a default, so a missing or partial YAML file still yields a
//! complete [`Config`]. The district table lives here too, which keeps the
//! per-district heuristics editable without touching code.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{EUC_KR, Encoding, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};

use crate::{dataset::Record, districts::DistrictTable};

pub const DEFAULT_CITY: &str = "서울특별시";
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// Open latitude/longitude interval a point must fall inside to count as
/// being in the city.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_lat: 37.4,
            max_lat: 37.7,
            min_lng: 126.8,
            max_lng: 127.2,
        }
    }
}

impl BoundingBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude > self.min_lat
            && latitude < self.max_lat
            && longitude > self.min_lng
            && longitude < self.max_lng
    }
}

/// District whose query results are screened for bad coordinates, and the
/// point substituted when nothing survives the screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackPolicy {
    pub district: String,
    pub placeholder: Record,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            district: "금천구".to_string(),
            placeholder: Record {
                latitude: Some(37.4566),
                longitude: Some(126.8958),
                address: "서울특별시 금천구 시흥대로73길 70".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub city: String,
    pub extensions: Vec<String>,
    pub encodings: Vec<String>,
    pub sample_rows: usize,
    pub bounding_box: BoundingBox,
    pub fallback: Option<FallbackPolicy>,
    pub districts: DistrictTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            extensions: vec!["csv".to_string()],
            encodings: vec![
                "cp949".to_string(),
                "utf-8".to_string(),
                "windows-1252".to_string(),
            ],
            sample_rows: DEFAULT_SAMPLE_ROWS,
            bounding_box: BoundingBox::default(),
            fallback: Some(FallbackPolicy::default()),
            districts: DistrictTable::seoul(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: Config = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing config YAML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(anyhow!("At least one source file extension is required"));
        }
        if self.sample_rows == 0 {
            return Err(anyhow!("sample_rows must be greater than zero"));
        }
        self.encoding_candidates()?;
        Ok(())
    }

    /// Resolves the configured encoding labels, in priority order.
    pub fn encoding_candidates(&self) -> Result<Vec<&'static Encoding>> {
        if self.encodings.is_empty() {
            return Err(anyhow!("At least one candidate encoding is required"));
        }
        let mut resolved: Vec<&'static Encoding> = Vec::with_capacity(self.encodings.len());
        for label in &self.encodings {
            let encoding = resolve_encoding(label)?;
            if !resolved.contains(&encoding) {
                resolved.push(encoding);
            }
        }
        Ok(resolved)
    }

    pub fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Looks up an encoding by WHATWG label, accepting the Python-style aliases
/// that data publishers tend to quote.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "cp949" | "ms949" | "uhc" => Ok(EUC_KR),
        "utf-8-sig" | "utf8-sig" | "utf8" => Ok(UTF_8),
        "iso-8859-1" | "latin-1" | "latin1" | "cp1252" => Ok(WINDOWS_1252),
        other => Encoding::for_label(other.as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{label}'")),
    }
}
