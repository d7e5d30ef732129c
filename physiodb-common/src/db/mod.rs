//! Database connection and schema layer
//!
//! One SQLite file holds everything: one table per catalog sensor, a
//! `participants` table, and the `data_dictionary` mirror of the catalog.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

mod schema;
pub use schema::{create_schema, quote_ident, refresh_data_dictionary};

/// Open (or create) the database file for writing
///
/// Failure here is fatal to the caller; no extraction work can proceed
/// without a target store.
pub async fn open_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Foreign keys stay declarative only. The participants table is
    // bulk-replaced by metadata loads while sensor rows still reference it,
    // so enforcement would reject a legitimate reload. sqlx enables the
    // foreign_keys pragma by default, so it must be switched off explicitly.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Connect to an existing database in read-only mode
///
/// The web service never writes; SQLite mode=ro enforces that at the
/// connection level.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(crate::Error::Config(format!(
            "Database not found: {}. Run physiodb-extract first to populate it.",
            db_path.display()
        )));
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    let pool = SqlitePool::connect(&db_url).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("physio.db");

        let pool = open_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        // Writable connection accepts DDL
        sqlx::query("CREATE TABLE scratch (id INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn readonly_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("absent.db");

        assert!(connect_readonly(&db_path).await.is_err());
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("physio.db");
        open_database(&db_path).await.unwrap();

        let pool = connect_readonly(&db_path).await.unwrap();
        let result = sqlx::query("CREATE TABLE _test_write (id INTEGER)")
            .execute(&pool)
            .await;
        assert!(result.is_err(), "write should fail on read-only connection");
    }
}
