use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for the [`crate::service::Dashboard`] facade.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Error type returned by readers, the cleaner, and the ingestion pipeline.
///
/// Only the final failure of the reader fallback chain surfaces as one of these; intermediate
/// failures are absorbed while the chain moves on to the next engine.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet engine error (either engine).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Delimited-text parser error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Delimited text that is not valid UTF-8.
    #[error("invalid text encoding: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The content could be read but not interpreted as a table.
    #[error("malformed input: {message}")]
    Malformed { message: String },

    /// A workbook without any sheet.
    #[error("workbook has no sheets")]
    NoSheets,

    /// Nothing survived cleaning.
    #[error("file is empty or contains no valid data")]
    EmptyTable,
}

impl IngestionError {
    /// `true` when an engine could not interpret the content (as opposed to an infrastructure
    /// failure such as a missing file).
    ///
    /// Spreadsheet errors are inspected through their source chain, since both engines wrap their
    /// own I/O errors.
    pub fn is_content_error(&self) -> bool {
        match self {
            IngestionError::Io(_) => false,
            IngestionError::Csv(err) => !matches!(err.kind(), ::csv::ErrorKind::Io(_)),
            IngestionError::Excel(err) => !error_chain_contains_io(err),
            IngestionError::Encoding(_)
            | IngestionError::Malformed { .. }
            | IngestionError::NoSheets
            | IngestionError::EmptyTable => true,
        }
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Error type returned by the dashboard facade.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The file could not be turned into a cached table. Nothing was cached.
    #[error("failed to process file: {0}")]
    Ingestion(#[from] IngestionError),

    /// The request is malformed: unknown table, missing chart fields, unsupported chart type,
    /// unknown column, or invalid configuration.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A lookup for an identifier that is not (or no longer) cached.
    #[error("table '{id}' not found; it may have expired or been cleared")]
    NotFound { id: String },

    /// An upload was refused before ingestion (extension or size limits).
    #[error("upload rejected: {message}")]
    UploadRejected { message: String },
}

impl DashboardError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DashboardError::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_not_content_errors() {
        let err = IngestionError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_content_error());
    }

    #[test]
    fn malformed_and_empty_are_content_errors() {
        assert!(IngestionError::Malformed { message: "x".into() }.is_content_error());
        assert!(IngestionError::EmptyTable.is_content_error());
        assert!(IngestionError::NoSheets.is_content_error());
    }

    #[test]
    fn dashboard_error_wraps_ingestion_message() {
        let err = DashboardError::from(IngestionError::EmptyTable);
        assert_eq!(
            err.to_string(),
            "failed to process file: file is empty or contains no valid data"
        );
    }
}
