//! physiodb-extract library - sensor log ETL
//!
//! Walks a data directory laid out as
//! `<root>/<participant>/<session>/<sensor>.{csv,txt}`, reconciles each file
//! against the static sensor catalog, and bulk-appends the rows into the
//! SQLite store created by `physiodb-common`.

pub mod extract;
pub mod parser;
pub mod scanner;

pub use extract::{extract_all, ExtractionSummary};
