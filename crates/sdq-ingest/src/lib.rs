//! Data Review Plan (DRP) ingestion.
//!
//! A DRP is a CSV of named validation checks. [`ingest`] validates its
//! header, resolves each row's columns through synonym lists, runs condition
//! extraction and synthesis per description and returns one
//! [`sdq_model::Scenario`] per usable row. [`export_csv`] and
//! [`build_package`] write scenario collections back out.

pub mod columns;
pub mod error;
pub mod export;
pub mod header;
pub mod pipeline;
pub mod table;

pub use error::{IngestError, Result, RowIssue, RowIssueKind};
pub use export::{EXPORT_HEADERS, PackageMetadata, SdqPackage, build_package, build_package_at, export_csv};
pub use header::{HeaderCategory, HeaderSuggestion, validate_headers};
pub use pipeline::{IngestOptions, IngestOutcome, ingest, ingest_with};
pub use table::{DrpRow, DrpTable, parse_csv_line, parse_table};
