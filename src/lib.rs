//! `sheet-dashboard` ingests spreadsheets and delimited text into an in-memory table cache, infers
//! what each column holds, and renders aggregated, chart-ready projections of a cached table.
//!
//! The primary entrypoint is [`service::Dashboard`], which wraps the whole pipeline:
//!
//! 1. read the file, picking the reader from its extension and leading bytes and falling back to
//!    the other readers when content and extension disagree ([`ingestion::ingest_from_path`])
//! 2. clean the raw table ([`cleaning::clean_table`])
//! 3. profile every column ([`profiling::profile_table`])
//! 4. store table and metadata under a fresh identifier ([`cache::TableCache`])
//!
//! ## What you can ingest
//!
//! - **Delimited text**: `.csv` (delimiter detected among `,` `;` tab `|`, UTF-8 with or without
//!   BOM)
//! - **Modern workbooks**: `.xlsx` (first sheet)
//! - **Legacy workbooks**: `.xls` (first sheet)
//!
//! A `.xls` that is really comma-separated text, or a `.csv` that is really a zip workbook, still
//! ingests.
//!
//! ## Quick example: ingest, inspect, chart
//!
//! ```no_run
//! use sheet_dashboard::charts::ChartRequest;
//! use sheet_dashboard::{Dashboard, DashboardConfig};
//!
//! # fn main() -> Result<(), sheet_dashboard::DashboardError> {
//! let dashboard = Dashboard::new(DashboardConfig::from_env()?);
//! let outcome = dashboard.ingest("sales.xlsx")?;
//! for col in &outcome.metadata.columns {
//!     println!("{} -> {:?}", col.name, col.inferred_type);
//! }
//!
//! let chart = dashboard.render_chart(
//!     &ChartRequest::new(&outcome.table_id, "bar")
//!         .with_axes("region", "sales")
//!         .with_group_by("quarter"),
//! )?;
//! println!("{}", serde_json::to_string(&chart).unwrap());
//!
//! dashboard.clear(Some(&outcome.table_id));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format sniffing, readers, fallback chain and ingestion observers
//! - [`cleaning`]: raw table → clean table
//! - [`profiling`]: column type inference and metadata
//! - [`cache`]: the table cache service
//! - [`processing`]: filters, group-by and aggregation functions
//! - [`charts`]: chart requests and chart shapes
//! - [`service`]: the [`Dashboard`] facade
//! - [`config`], [`error`], [`types`]
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber. Ingestion outcomes can also be
//! routed to an [`ingestion::IngestionObserver`], e.g. [`ingestion::TracingObserver`].

pub mod cache;
pub mod charts;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod profiling;
pub mod service;
pub mod types;

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult, IngestionError, IngestionResult};
pub use service::{Dashboard, IngestOutcome};
