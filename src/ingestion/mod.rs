//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - sniffs the format from the file extension and its leading bytes ([`sniff`])
//! - reads the file with the selected engine, falling back to the other engines when the content
//!   and the declared extension disagree
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`excel`]

pub mod csv;
pub mod excel;
pub mod observability;
pub mod sniff;
pub mod unified;

pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStage,
    IngestionStats, TracingObserver,
};
pub use sniff::{sniff, ReadPlan, Sniffed};
pub use unified::{ingest_from_path, IngestedTable, IngestionFormat, IngestionOptions};

/// Turn raw header cells into unique, non-empty column names.
///
/// Blank headers become `Unnamed: {index}`; repeated names get `.1`, `.2`, ... suffixes.
pub(crate) fn unique_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for (idx, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::unique_headers;

    #[test]
    fn headers_are_named_and_deduplicated() {
        let raw = vec!["id", " ", "name", "name", "id"]
            .into_iter()
            .map(String::from);
        assert_eq!(
            unique_headers(raw),
            vec!["id", "Unnamed: 1", "name", "name.1", "id.1"]
        );
    }
}
