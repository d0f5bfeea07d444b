//! The narrow function-level facade a host (HTTP layer, CLI, ...) drives.
//!
//! A [`Dashboard`] owns the configuration and a handle to the [`TableCache`]; construct it once at
//! startup and share it by reference or `Arc`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{SharedTableCache, TableCache};
use crate::charts::{self, ChartOutput, ChartRequest};
use crate::cleaning::clean_table;
use crate::config::{extension_of, DashboardConfig};
use crate::error::{DashboardError, DashboardResult, IngestionError};
use crate::ingestion::unified::read_reporting_failure;
use crate::ingestion::{IngestionContext, IngestionOptions, IngestionStage, IngestionStats};
use crate::profiling::{profile_table, InferenceThresholds, TableMetadata};
use crate::types::Record;

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    /// Identifier of the cached table.
    #[serde(rename = "file_id")]
    pub table_id: String,
    pub metadata: TableMetadata,
    /// First rows of the clean table, at most `preview_rows` of them.
    pub preview: Vec<Record>,
    pub preview_row_count: usize,
}

/// Ingestion, metadata, chart rendering and cache lifecycle behind one handle.
///
/// Clones share the cache.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    cache: SharedTableCache,
    options: IngestionOptions,
    thresholds: InferenceThresholds,
}

impl Dashboard {
    /// A dashboard with its own cache, honoring `config.cache_ttl`.
    pub fn new(config: DashboardConfig) -> Self {
        let cache = TableCache::shared(config.cache_ttl);
        Self::with_cache(config, cache)
    }

    /// A dashboard over an existing cache.
    pub fn with_cache(config: DashboardConfig, cache: SharedTableCache) -> Self {
        Self {
            config,
            cache,
            options: IngestionOptions::default(),
            thresholds: InferenceThresholds::default(),
        }
    }

    /// Replace the reader options (forced format, observer, alert threshold).
    pub fn with_ingestion_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_thresholds(mut self, thresholds: InferenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &SharedTableCache {
        &self.cache
    }

    /// Read, clean, profile and cache the file at `path`.
    ///
    /// Nothing is cached unless every step succeeds. The observer, if any, hears about the
    /// outcome once, after cleaning.
    pub fn ingest(&self, path: impl AsRef<Path>) -> DashboardResult<IngestOutcome> {
        let path = path.as_ref();
        let raw = read_reporting_failure(path, &self.options)?;
        let raw_stats = raw.stats();
        let ctx = IngestionContext {
            path: path.to_path_buf(),
            format: Some(raw.format),
            stage: IngestionStage::Clean,
        };

        let table = clean_table(raw.table)
            .inspect_err(|err| self.options.report_failure(&ctx, err))?;
        let clean_stats = IngestionStats {
            rows: table.row_count(),
            columns: table.column_count(),
        };
        self.options.report_cleaned(&ctx, raw_stats, clean_stats);
        self.options.report_success(&ctx, clean_stats);

        let metadata = profile_table(&table, &raw.sheet_names, &self.thresholds);
        let preview = table.head(self.config.preview_rows);
        let preview_row_count = preview.len();

        let table_id = self.cache.put(table, metadata.clone(), path);
        info!(
            table_id = %table_id,
            path = %path.display(),
            rows = clean_stats.rows,
            columns = clean_stats.columns,
            "ingested file"
        );

        Ok(IngestOutcome {
            table_id,
            metadata,
            preview,
            preview_row_count,
        })
    }

    /// Check, store and ingest an uploaded payload.
    ///
    /// The bytes are written under `upload_dir` (created when missing) keeping the extension of
    /// `file_name`; the stored file stays in place after ingestion.
    pub fn ingest_upload(&self, file_name: &str, bytes: &[u8]) -> DashboardResult<IngestOutcome> {
        self.config.check_upload(file_name, bytes.len() as u64)?;

        let stored = self.store_upload(file_name, bytes).map_err(IngestionError::from)?;
        debug!(file_name, stored = %stored.display(), size = bytes.len(), "stored upload");
        self.ingest(&stored)
    }

    fn store_upload(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.config.upload_dir)?;
        let ext = extension_of(Path::new(file_name));
        let stored = self
            .config
            .upload_dir
            .join(format!("upload-{}{ext}", Uuid::new_v4()));
        fs::write(&stored, bytes)?;
        Ok(stored)
    }

    /// Metadata of a cached table.
    pub fn get_metadata(&self, table_id: &str) -> DashboardResult<TableMetadata> {
        self.cache
            .get(table_id)
            .map(|entry| entry.metadata.clone())
            .ok_or_else(|| DashboardError::NotFound {
                id: table_id.to_string(),
            })
    }

    /// Render a chart from a cached table.
    ///
    /// An unknown table is a validation error here, unlike [`Self::get_metadata`].
    pub fn render_chart(&self, request: &ChartRequest) -> DashboardResult<ChartOutput> {
        let plan = request.plan()?;
        let entry = self.cache.get(&request.table_id).ok_or_else(|| {
            DashboardError::validation(format!("table '{}' not found", request.table_id))
        })?;

        let output = charts::render(&entry.table, &plan)?;
        info!(table_id = %request.table_id, chart_type = %plan.chart_type, "rendered chart");
        Ok(output)
    }

    /// Drop one cached table, or all of them with `None`. Unknown identifiers are ignored.
    pub fn clear(&self, table_id: Option<&str>) {
        match table_id {
            Some(id) => self.cache.clear(id),
            None => self.cache.clear_all(),
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}
