use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::IngestionError;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity of a failed ingestion. I/O anywhere in the error is critical.
    pub fn for_error(e: &IngestionError) -> Self {
        if e.is_content_error() {
            IngestionSeverity::Error
        } else {
            IngestionSeverity::Critical
        }
    }
}

/// Pipeline step an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionStage {
    /// Reading bytes into a raw table.
    Read,
    /// Cleaning the raw table.
    Clean,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input path used for ingestion.
    pub path: PathBuf,
    /// Format that produced the table; `None` when every reader failed.
    pub format: Option<IngestionFormat>,
    /// Last step reached.
    pub stage: IngestionStage,
}

/// Minimal stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of ingested rows.
    pub rows: usize,
    /// Number of ingested columns.
    pub columns: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Every ingestion ends in exactly one `on_success` or `on_failure`. Reading on its own
/// ([`super::ingest_from_path`]) ends at [`IngestionStage::Read`]; a
/// [`crate::Dashboard`] ingestion ends at [`IngestionStage::Clean`] and reports the clean table's
/// shape, with [`Self::on_cleaned`] called just before `on_success`.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called once cleaning has accepted a raw table.
    fn on_cleaned(&self, _ctx: &IngestionContext, _raw: IngestionStats, _clean: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(
        &self,
        _ctx: &IngestionContext,
        _severity: IngestionSeverity,
        _error: &IngestionError,
    ) {
    }

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(
        &self,
        ctx: &IngestionContext,
        severity: IngestionSeverity,
        error: &IngestionError,
    ) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_cleaned(&self, ctx: &IngestionContext, raw: IngestionStats, clean: IngestionStats) {
        for o in &self.observers {
            o.on_cleaned(ctx, raw, clean);
        }
    }

    fn on_failure(
        &self,
        ctx: &IngestionContext,
        severity: IngestionSeverity,
        error: &IngestionError,
    ) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(
        &self,
        ctx: &IngestionContext,
        severity: IngestionSeverity,
        error: &IngestionError,
    ) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards ingestion events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            format = ?ctx.format,
            stage = ?ctx.stage,
            path = %ctx.path.display(),
            rows = stats.rows,
            columns = stats.columns,
            "ingest ok"
        );
    }

    fn on_cleaned(&self, ctx: &IngestionContext, raw: IngestionStats, clean: IngestionStats) {
        tracing::debug!(
            path = %ctx.path.display(),
            rows_dropped = raw.rows.saturating_sub(clean.rows),
            columns_dropped = raw.columns.saturating_sub(clean.columns),
            "cleaned"
        );
    }

    fn on_failure(
        &self,
        ctx: &IngestionContext,
        severity: IngestionSeverity,
        error: &IngestionError,
    ) {
        tracing::warn!(
            ?severity,
            stage = ?ctx.stage,
            format = ?ctx.format,
            path = %ctx.path.display(),
            %error,
            "ingest failed"
        );
    }

    fn on_alert(
        &self,
        ctx: &IngestionContext,
        severity: IngestionSeverity,
        error: &IngestionError,
    ) {
        tracing::error!(
            ?severity,
            stage = ?ctx.stage,
            format = ?ctx.format,
            path = %ctx.path.display(),
            %error,
            "ingest alert"
        );
    }
}
