//! Extraction orchestration
//!
//! `extract_all` is the whole pipeline: open the store, create the schema,
//! load participant metadata, discover files, reconcile and append each one.
//! Individual file failures are logged and skipped; only a failure to open
//! the store itself aborts the run.

use crate::parser::{self, CellValue, ParsedFile};
use crate::scanner::{self, DataFile};
use physiodb_common::db::{self, quote_ident};
use physiodb_common::{catalog, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{error, info, warn};

/// Counters reported at the end of a run
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_records: u64,
}

/// Run the full extraction pipeline against a data root and database file
pub async fn extract_all(data_root: &Path, db_path: &Path) -> Result<ExtractionSummary> {
    info!("Starting extraction from {}", data_root.display());

    // Fatal: without a store there is nothing to do
    let pool = db::open_database(db_path).await?;
    db::create_schema(&pool).await?;

    load_metadata(&pool, data_root).await;

    let data_files = scanner::scan_data_files(data_root)?;
    if data_files.is_empty() {
        warn!("No data files found; check the data directory layout");
    }

    let mut summary = ExtractionSummary::default();
    for file in &data_files {
        match process_data_file(&pool, file).await {
            Ok(records) => {
                info!(
                    "Loaded {} ({} records)",
                    file.path.display(),
                    records
                );
                summary.files_processed += 1;
                summary.total_records += records;
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.path.display(), e);
                summary.files_failed += 1;
            }
        }
    }

    info!(
        "Extraction complete: {} records from {} files ({} failed)",
        summary.total_records, summary.files_processed, summary.files_failed
    );
    log_table_counts(&pool).await;

    Ok(summary)
}

/// Bulk-replace the participants table from `<root>/metadata.csv`
///
/// The table is dropped and rebuilt from the CSV header so arbitrary
/// metadata columns load verbatim. A missing or malformed file is non-fatal.
async fn load_metadata(pool: &SqlitePool, data_root: &Path) {
    let metadata_path = data_root.join("metadata.csv");
    if !metadata_path.exists() {
        warn!("Metadata file not found: {}", metadata_path.display());
        return;
    }

    match replace_participants(pool, &metadata_path).await {
        Ok(count) => info!("Loaded metadata for {} participants", count),
        Err(e) => error!("Failed to load metadata: {}", e),
    }
}

async fn replace_participants(pool: &SqlitePool, path: &Path) -> Result<u64> {
    let contents = std::fs::read_to_string(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(contents.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| physiodb_common::Error::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| physiodb_common::Error::Csv(e.to_string()))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(i, cell)| sniff_metadata_cell(&headers, i, cell))
            .collect();
        rows.push(row);
    }

    // Column types follow the first data row; identifiers always stay TEXT
    let column_defs: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let sql_type = match rows.first().map(|row| &row[i]) {
                Some(CellValue::Int(_)) => "INTEGER",
                Some(CellValue::Float(_)) => "REAL",
                _ => "TEXT",
            };
            format!("{} {}", quote_ident(name), sql_type)
        })
        .collect();

    let mut tx = pool.begin().await?;

    sqlx::query("DROP TABLE IF EXISTS participants")
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!(
        "CREATE TABLE participants ({})",
        column_defs.join(", ")
    ))
    .execute(&mut *tx)
    .await?;

    let placeholders = vec!["?"; headers.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO participants ({}) VALUES ({})",
        headers
            .iter()
            .map(|h| quote_ident(h))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders
    );

    let mut count = 0u64;
    for row in &rows {
        let mut query = sqlx::query(&insert_sql);
        for value in row {
            query = bind_cell(query, value);
        }
        query.execute(&mut *tx).await?;
        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

/// Metadata cells are sniffed like sensor cells, except the participant
/// identifier which must stay textual to match the sensor tables' tagging.
fn sniff_metadata_cell(headers: &[String], index: usize, cell: &str) -> CellValue {
    let trimmed = cell.trim();
    if headers.get(index).map(String::as_str) == Some("participant_id") {
        return CellValue::Text(trimmed.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(trimmed.to_string())
}

/// Reconcile one discovered file and append its rows to the sensor table
async fn process_data_file(pool: &SqlitePool, file: &DataFile) -> Result<u64> {
    let def = catalog::lookup(file.sensor_name).ok_or_else(|| {
        physiodb_common::Error::Internal(format!("sensor missing from catalog: {}", file.sensor_name))
    })?;

    let parsed = parser::parse_sensor_file(&file.path, def.columns)?;
    append_rows(pool, file, &parsed).await
}

/// Insert all reconciled rows for one file inside a single transaction
///
/// The transaction gives a failed file all-or-nothing semantics: it either
/// contributes every row or none.
async fn append_rows(pool: &SqlitePool, file: &DataFile, parsed: &ParsedFile) -> Result<u64> {
    let mut column_names: Vec<String> =
        parsed.columns.iter().map(|c| quote_ident(c)).collect();
    column_names.push("participant_id".to_string());
    column_names.push("session_id".to_string());

    let placeholders = vec!["?"; column_names.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(file.sensor_name),
        column_names.join(", "),
        placeholders
    );

    let mut tx = pool.begin().await?;
    let mut count = 0u64;

    for row in &parsed.rows {
        let mut query = sqlx::query(&insert_sql);
        for value in row {
            query = bind_cell(query, value);
        }
        query = query.bind(&file.participant_id).bind(file.session_id);
        query.execute(&mut *tx).await?;
        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

fn bind_cell<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: &'q CellValue,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        CellValue::Int(i) => query.bind(*i),
        CellValue::Float(f) => query.bind(*f),
        CellValue::Text(s) => query.bind(s.as_str()),
    }
}

/// Log per-table row counts after a run
async fn log_table_counts(pool: &SqlitePool) {
    let tables: Vec<String> = match sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    {
        Ok(tables) => tables,
        Err(e) => {
            warn!("Could not enumerate tables for summary: {}", e);
            return;
        }
    };

    for table in tables {
        let count: std::result::Result<i64, sqlx::Error> =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(&table)))
                .fetch_one(pool)
                .await;
        match count {
            Ok(count) if count > 0 => info!("  {}: {} records", table, count),
            Ok(_) => {}
            Err(e) => warn!("  {}: count failed ({})", table, e),
        }
    }
}
