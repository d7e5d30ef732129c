//! Delimited-text parsing and column reconciliation
//!
//! Raw sensor exports disagree on delimiters and occasionally on column
//! counts. Parsing tries comma, then tab, then space; the first delimiter
//! whose header width matches the catalog definition wins. Reconciliation is
//! positional: a shortfall is padded with zeros, a surplus is silently
//! dropped. Both behaviors are load-bearing; downstream analysis relies on
//! the canonical column list regardless of what the file claimed.

use physiodb_common::{Error, Result};
use std::path::Path;
use tracing::warn;

/// A single parsed cell, typed for SQLite binding
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// A file parsed and reconciled against its sensor definition
#[derive(Debug)]
pub struct ParsedFile {
    /// Canonical column names (always exactly the catalog's list)
    pub columns: Vec<String>,
    /// Data rows, each exactly `columns.len()` wide
    pub rows: Vec<Vec<CellValue>>,
}

const DELIMITERS: &[u8] = b",\t ";

/// Parse a sensor file and align it to the expected column list
///
/// The first record is always treated as a header row and consumed.
pub fn parse_sensor_file(path: &Path, expected_columns: &[&str]) -> Result<ParsedFile> {
    let contents = std::fs::read_to_string(path)?;
    let (delimiter, width) = choose_delimiter(&contents, expected_columns.len())?;
    if width != expected_columns.len() {
        warn!(
            "Column count mismatch in {}: expected {}, found {}",
            path.display(),
            expected_columns.len(),
            width
        );
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let width = expected_columns.len();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| Error::Csv(e.to_string()))?;
        let mut row: Vec<CellValue> = record
            .iter()
            .take(width) // surplus columns dropped
            .map(sniff_cell)
            .collect();
        while row.len() < width {
            row.push(CellValue::Int(0)); // shortfall padded with zero
        }
        rows.push(row);
    }

    if rows.is_empty() {
        warn!("No data rows in {}", path.display());
    }

    Ok(ParsedFile {
        columns: expected_columns.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

/// Pick the delimiter whose header width matches the expected column count
///
/// When no delimiter matches exactly, the widest parse wins (earliest
/// delimiter on ties) and reconciliation pads or truncates the difference.
fn choose_delimiter(contents: &str, expected: usize) -> Result<(u8, usize)> {
    let mut best = (DELIMITERS[0], 0);

    for &delimiter in DELIMITERS {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(contents.as_bytes());

        let width = reader
            .headers()
            .map_err(|e| Error::Csv(e.to_string()))?
            .len();

        if width == expected {
            return Ok((delimiter, width));
        }
        if width > best.1 {
            best = (delimiter, width);
        }
    }

    Ok(best)
}

/// Type-sniff a cell: integer, then float, then raw text
fn sniff_cell(cell: &str) -> CellValue {
    let trimmed = cell.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(trimmed.to_string())
}
