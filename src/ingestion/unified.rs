//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which reads a file into a raw
//! [`crate::types::Table`] and reports the sheet names it found.
//!
//! - If [`IngestionOptions::format`] is `None`, the first reader is chosen by [`super::sniff`].
//! - Whatever the first reader, a failure walks the fallback chain before giving up; uploaded
//!   files often carry an extension that does not match their content.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{IngestionError, IngestionResult};
use crate::types::Table;

use super::csv;
use super::excel::{self, SpreadsheetEngine};
use super::observability::{
    IngestionContext, IngestionObserver, IngestionSeverity, IngestionStage, IngestionStats,
};
use super::sniff::{sniff, ReadPlan};

/// Sheet name reported for delimited text.
pub const CSV_SHEET_NAME: &str = "csv";

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Delimited text.
    Csv,
    /// Modern (zip container) spreadsheet.
    Xlsx,
    /// Legacy spreadsheet.
    Xls,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, sniff the file to pick the first reader.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl IngestionOptions {
    pub(crate) fn report_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        if let Some(obs) = self.observer.as_ref() {
            obs.on_success(ctx, stats);
        }
    }

    pub(crate) fn report_cleaned(
        &self,
        ctx: &IngestionContext,
        raw: IngestionStats,
        clean: IngestionStats,
    ) {
        if let Some(obs) = self.observer.as_ref() {
            obs.on_cleaned(ctx, raw, clean);
        }
    }

    /// Report a failure to the observer, alerting when the severity meets the threshold.
    pub(crate) fn report_failure(&self, ctx: &IngestionContext, error: &IngestionError) {
        if let Some(obs) = self.observer.as_ref() {
            let sev = IngestionSeverity::for_error(error);
            obs.on_failure(ctx, sev, error);
            if sev >= self.alert_at_or_above {
                obs.on_alert(ctx, sev, error);
            }
        }
    }
}

/// A raw table as read from a file, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedTable {
    /// Raw cells.
    pub table: Table,
    /// Sheet names in workbook order; the first one was read. `["csv"]` for delimited text.
    pub sheet_names: Vec<String>,
    /// Reader that produced the table.
    pub format: IngestionFormat,
    /// Source path.
    pub path: PathBuf,
}

impl IngestedTable {
    pub fn stats(&self) -> IngestionStats {
        IngestionStats {
            rows: self.table.row_count(),
            columns: self.table.column_count(),
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// Reader selection (see [`super::sniff::Sniffed::plan`]) then the fallback chain:
///
/// - a content error (the engine cannot interpret the bytes) retries with the legacy spreadsheet
///   engine, and if that fails too, with delimited text
/// - any other error retries once with delimited text
/// - the error of the last attempt is returned
///
/// When an observer is configured, this function reports, at [`IngestionStage::Read`]:
///
/// - `on_success` on success, with raw row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use sheet_dashboard::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), sheet_dashboard::IngestionError> {
/// // A `.xls` file that is really comma-separated text still ingests.
/// let raw = ingest_from_path("exported_report.xls", &IngestionOptions::default())?;
/// println!("rows={} sheets={:?}", raw.table.row_count(), raw.sheet_names);
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<IngestedTable> {
    let path = path.as_ref();
    let ingested = read_reporting_failure(path, options)?;
    options.report_success(
        &IngestionContext {
            path: path.to_path_buf(),
            format: Some(ingested.format),
            stage: IngestionStage::Read,
        },
        ingested.stats(),
    );
    Ok(ingested)
}

/// Read `path` through the fallback chain, reporting only a failure to the observer.
pub(crate) fn read_reporting_failure(
    path: &Path,
    options: &IngestionOptions,
) -> IngestionResult<IngestedTable> {
    let plan = match options.format {
        Some(f) => ReadPlan::from(f),
        None => sniff(path).plan(),
    };
    debug!(path = %path.display(), ?plan, "reading file");

    read_with_fallback(path, plan).inspect_err(|e| {
        options.report_failure(
            &IngestionContext {
                path: path.to_path_buf(),
                format: None,
                stage: IngestionStage::Read,
            },
            e,
        )
    })
}

fn read_with_fallback(path: &Path, plan: ReadPlan) -> IngestionResult<IngestedTable> {
    match read_planned(path, plan) {
        Ok(ingested) => Ok(ingested),
        Err(err) if err.is_content_error() => {
            warn!(
                path = %path.display(),
                %err,
                "content not readable as planned; trying legacy spreadsheet engine"
            );
            read_sheet(path, SpreadsheetEngine::Legacy).or_else(|legacy_err| {
                debug!(
                    %legacy_err,
                    "legacy spreadsheet engine failed; falling back to delimited text"
                );
                read_csv(path)
            })
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "read failed; last attempt as delimited text");
            read_csv(path)
        }
    }
}

fn read_planned(path: &Path, plan: ReadPlan) -> IngestionResult<IngestedTable> {
    match plan {
        ReadPlan::Csv => read_csv(path),
        ReadPlan::Xlsx => read_sheet(path, SpreadsheetEngine::Modern),
        ReadPlan::Xls => read_sheet(path, SpreadsheetEngine::Legacy),
        ReadPlan::CsvThenXlsx => read_csv(path).or_else(|csv_err| {
            debug!(%csv_err, "not delimited text; trying modern spreadsheet engine");
            read_sheet(path, SpreadsheetEngine::Modern)
        }),
    }
}

fn read_csv(path: &Path) -> IngestionResult<IngestedTable> {
    let table = csv::ingest_csv_from_path(path)?;
    Ok(IngestedTable {
        table,
        sheet_names: vec![CSV_SHEET_NAME.to_string()],
        format: IngestionFormat::Csv,
        path: path.to_path_buf(),
    })
}

fn read_sheet(path: &Path, engine: SpreadsheetEngine) -> IngestionResult<IngestedTable> {
    let (table, sheet_names) = excel::ingest_excel_from_path(path, engine)?;
    Ok(IngestedTable {
        table,
        sheet_names,
        format: match engine {
            SpreadsheetEngine::Modern => IngestionFormat::Xlsx,
            SpreadsheetEngine::Legacy => IngestionFormat::Xls,
        },
        path: path.to_path_buf(),
    })
}
