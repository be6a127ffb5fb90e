//! Owner of the source directory, the configuration, and the published dataset.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use log::info;

use crate::{
    config::Config,
    dataset::{Dataset, SharedDataset},
    ingest::{self, LoadReport},
    query::QueryEngine,
};

#[derive(Debug)]
pub struct BinCatalog {
    data_dir: PathBuf,
    config: Config,
    shared: Arc<SharedDataset>,
}

impl BinCatalog {
    /// Creates a catalog with an empty dataset; call [`BinCatalog::reload`] to ingest.
    pub fn new(data_dir: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
            shared: Arc::new(SharedDataset::new(Dataset::new())),
        }
    }

    /// Creates the catalog and runs the first ingestion pass.
    pub fn load(data_dir: impl Into<PathBuf>, config: Config) -> Result<(Self, LoadReport)> {
        let catalog = Self::new(data_dir, config);
        let report = catalog.reload()?;
        Ok((catalog, report))
    }

    /// Re-ingests every source file and publishes the result. Readers keep
    /// whichever snapshot they already hold until the swap.
    pub fn reload(&self) -> Result<LoadReport> {
        info!("Ingesting sources from {:?}", self.data_dir);
        let (dataset, report) = ingest::build_dataset(&self.data_dir, &self.config)?;
        report.log_summary();
        self.shared.publish(dataset);
        Ok(report)
    }

    pub fn dataset(&self) -> Arc<SharedDataset> {
        Arc::clone(&self.shared)
    }

    pub fn query_engine(&self) -> QueryEngine {
        QueryEngine::new(
            Arc::clone(&self.shared),
            self.config.bounding_box,
            self.config.fallback.clone(),
        )
    }
}
