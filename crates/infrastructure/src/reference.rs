//! JSON-file reference data
//!
//! One file per warehouse reference table, each holding an array of rows
//! with the warehouse's upper-case column names.

use async_trait::async_trait;
use domain::repositories::{
    BrandRef, ChannelRef, FactRef, ReferenceDataRepository, SalesLineRef, TimeDimensionRef,
};
use domain::{DomainError, DomainResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use serde_json::Value;
use tracing::{debug, warn};

pub const BRANDS_FILE: &str = "ds_brand.json";
pub const CHANNELS_FILE: &str = "ds_channel.json";
pub const SALES_LINES_FILE: &str = "ds_sales_line.json";
pub const FACTS_FILE: &str = "ds_fact.json";
pub const TIME_DIMENSION_FILE: &str = "ds_time_dimension.json";

/// Reads the reference tables from a directory on every call
pub struct JsonReferenceRepository {
    dir: PathBuf,
}

impl JsonReferenceRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_table<T: DeserializeOwned>(&self, file: &str) -> DomainResult<Vec<T>> {
        let path = self.dir.join(file);
        let content = fs::read_to_string(&path).await.map_err(|e| {
            DomainError::ReferenceDataUnavailable(format!("{}: {}", path.display(), e))
        })?;

        let rows: Vec<T> = serde_json::from_str(&content).map_err(|e| {
            DomainError::ReferenceDataUnavailable(format!("{}: {}", path.display(), e))
        })?;

        debug!(table = file, rows = rows.len(), "Loaded reference table");
        Ok(rows)
    }

    /// Like `read_table`, but rows that fail to deserialize are logged and
    /// dropped instead of failing the whole table
    async fn read_table_skipping_bad_rows<T: DeserializeOwned>(
        &self,
        file: &str,
    ) -> DomainResult<Vec<T>> {
        let raw: Vec<Value> = self.read_table(file).await?;
        let total = raw.len();

        let rows: Vec<T> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(table = file, row = index, error = %e, "Skipping unreadable reference row");
                    None
                }
            })
            .collect();

        if rows.len() < total {
            debug!(table = file, kept = rows.len(), total, "Dropped unreadable rows");
        }
        Ok(rows)
    }
}

#[async_trait]
impl ReferenceDataRepository for JsonReferenceRepository {
    async fn brands(&self) -> DomainResult<Vec<BrandRef>> {
        self.read_table(BRANDS_FILE).await
    }

    async fn channels(&self) -> DomainResult<Vec<ChannelRef>> {
        self.read_table(CHANNELS_FILE).await
    }

    async fn sales_lines(&self) -> DomainResult<Vec<SalesLineRef>> {
        self.read_table(SALES_LINES_FILE).await
    }

    async fn facts(&self) -> DomainResult<Vec<FactRef>> {
        self.read_table(FACTS_FILE).await
    }

    async fn time_dimension(&self) -> DomainResult<Vec<TimeDimensionRef>> {
        self.read_table_skipping_bad_rows(TIME_DIMENSION_FILE).await
    }
}
