//! Per-file ingestion and dataset aggregation.
//!
//! Each discovered source runs resolver -> classifier -> reconstructor ->
//! validator exactly once. A failing file is logged and skipped; it never
//! aborts the pass. The aggregated [`Dataset`] keeps file-discovery order.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Result;
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    address::{self, AddressReconstructor},
    config::Config,
    coords::CoordinateValidator,
    dataset::{Dataset, Record},
    districts::{CoordinatePolicy, DistrictRule},
    error::IngestError,
    io_utils::{self, RawTable},
    resolver::EncodingResolver,
    roles::{ColumnRoles, RoleClassifier},
};

/// A discovered source file and the district its name points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub inferred_district: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, config: &Config) -> Self {
        let path = path.into();
        let inferred_district = config
            .districts
            .infer_from_file_name(&io_utils::file_name_lossy(&path))
            .map(|rule| rule.name.clone());
        Self {
            path,
            inferred_district,
        }
    }
}

/// Records produced from one source file.
#[derive(Debug)]
pub struct FileIngest {
    pub encoding: &'static Encoding,
    pub roles: ColumnRoles,
    pub records: Vec<Record>,
    pub excluded: usize,
}

pub struct Ingestor<'a> {
    config: &'a Config,
    resolver: EncodingResolver,
    classifier: RoleClassifier<'a>,
    reconstructor: AddressReconstructor<'a>,
}

impl<'a> Ingestor<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: EncodingResolver::new(config.encoding_candidates()?),
            classifier: RoleClassifier::new(&config.districts, config.sample_rows),
            reconstructor: AddressReconstructor::new(
                &config.city,
                &config.districts,
                config.sample_rows,
            )?,
        })
    }

    pub fn ingest_file(&self, source: &SourceFile) -> Result<FileIngest, IngestError> {
        let bytes = io_utils::read_source(&source.path)?;
        self.ingest_bytes(source, &bytes)
    }

    pub fn ingest_bytes(&self, source: &SourceFile, bytes: &[u8]) -> Result<FileIngest, IngestError> {
        let decoded = self.resolver.resolve(&source.path, bytes)?;
        debug!(
            "{:?} decoded as {} ({} column(s), {} row(s)); headers {:?}",
            source.path,
            decoded.encoding.name(),
            decoded.table.width(),
            decoded.table.len(),
            decoded.table.headers
        );
        let (roles, records, excluded) = self.normalize(source, &decoded.table)?;
        Ok(FileIngest {
            encoding: decoded.encoding,
            roles,
            records,
            excluded,
        })
    }

    fn normalize(
        &self,
        source: &SourceFile,
        table: &RawTable,
    ) -> Result<(ColumnRoles, Vec<Record>, usize), IngestError> {
        let roles = self.classifier.classify(table);
        if !roles.has_address_source() {
            return Err(IngestError::SchemaUnresolved {
                path: source.path.clone(),
                headers: table.headers.clone(),
            });
        }

        let district = self.district_rule(source);
        let addresses = self.reconstructor.reconstruct(table, &roles, district);
        let validator = CoordinateValidator::new(
            district
                .map(|rule| rule.coordinates)
                .unwrap_or(CoordinatePolicy::Trusted),
            self.config.bounding_box,
        );

        let mut records = Vec::with_capacity(table.len());
        let mut excluded = 0usize;
        for (idx, candidate) in addresses.into_iter().enumerate() {
            let Some(address) = candidate.as_deref().and_then(address::finalize) else {
                excluded += 1;
                debug!("{:?}: {}", source.path, IngestError::RowExcluded { row: idx + 2 });
                continue;
            };
            let (latitude, longitude) = validator.validate(
                roles.latitude.and_then(|col| table.cell(idx, col)),
                roles.longitude.and_then(|col| table.cell(idx, col)),
            );
            records.push(Record {
                latitude,
                longitude,
                address,
            });
        }
        Ok((roles, records, excluded))
    }

    fn district_rule(&self, source: &SourceFile) -> Option<&'a DistrictRule> {
        source
            .inferred_district
            .as_deref()
            .and_then(|name| self.config.districts.by_name(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Loaded {
        encoding: String,
        rows: usize,
        excluded: usize,
    },
    Empty {
        encoding: String,
        excluded: usize,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub district: Option<String>,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Diagnostics for one ingestion pass. Not part of the query contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub succeeded_districts: BTreeSet<String>,
    pub failed_districts: BTreeSet<String>,
    /// Table districts that no discovered file name pointed at.
    pub missing_districts: BTreeSet<String>,
    pub files: Vec<FileOutcome>,
    pub total_records: usize,
}

impl LoadReport {
    pub fn log_summary(&self) {
        info!(
            "Loaded {} record(s) from {} file(s)",
            self.total_records,
            self.files
                .iter()
                .filter(|f| matches!(f.status, FileStatus::Loaded { .. }))
                .count()
        );
        info!(
            "Districts loaded: [{}]",
            self.succeeded_districts.iter().join(", ")
        );
        if !self.failed_districts.is_empty() {
            warn!(
                "Districts that failed to load: [{}]",
                self.failed_districts.iter().join(", ")
            );
        }
        if !self.missing_districts.is_empty() {
            debug!(
                "Districts without a source file: [{}]",
                self.missing_districts.iter().join(", ")
            );
        }
    }
}

/// Ingests every matching file under `data_dir` into a fresh [`Dataset`].
///
/// A missing or unreadable directory yields an empty dataset, not an error.
/// The returned error covers configuration problems only.
pub fn build_dataset(data_dir: &Path, config: &Config) -> Result<(Dataset, LoadReport)> {
    let ingestor = Ingestor::new(config)?;
    let mut dataset = Dataset::new();
    let mut report = LoadReport::default();
    let mut seen_districts = BTreeSet::new();

    let files = if data_dir.is_dir() {
        match io_utils::discover_sources(data_dir, |path| config.has_extension(path)) {
            Ok(files) => files,
            Err(err) => {
                warn!("{err:#}");
                Vec::new()
            }
        }
    } else {
        warn!("Data directory {data_dir:?} does not exist");
        Vec::new()
    };
    info!(
        "Discovered {} source file(s) in {:?}: [{}]",
        files.len(),
        data_dir,
        files.iter().map(|p| io_utils::file_name_lossy(p)).join(", ")
    );

    for path in files {
        let source = SourceFile::new(path, config);
        if let Some(name) = &source.inferred_district {
            seen_districts.insert(name.clone());
        }
        let status = match ingestor.ingest_file(&source) {
            Ok(ingest) if !ingest.records.is_empty() => {
                info!(
                    "{:?} loaded {} record(s) using {}",
                    source.path,
                    ingest.records.len(),
                    ingest.encoding.name()
                );
                if let Some(name) = &source.inferred_district {
                    report.succeeded_districts.insert(name.clone());
                }
                let status = FileStatus::Loaded {
                    encoding: ingest.encoding.name().to_string(),
                    rows: ingest.records.len(),
                    excluded: ingest.excluded,
                };
                dataset.extend(ingest.records);
                status
            }
            Ok(ingest) => {
                warn!("{:?} produced no usable rows", source.path);
                FileStatus::Empty {
                    encoding: ingest.encoding.name().to_string(),
                    excluded: ingest.excluded,
                }
            }
            Err(err) => {
                warn!("Skipping {:?}: {err}", source.path);
                FileStatus::Skipped {
                    reason: err.to_string(),
                }
            }
        };
        report.files.push(FileOutcome {
            path: source.path,
            district: source.inferred_district,
            status,
        });
    }

    report.failed_districts = seen_districts
        .difference(&report.succeeded_districts)
        .cloned()
        .collect();
    report.missing_districts = config
        .districts
        .rules()
        .iter()
        .map(|rule| rule.name.clone())
        .filter(|name| !seen_districts.contains(name))
        .collect();
    report.total_records = dataset.len();
    Ok((dataset, report))
}
