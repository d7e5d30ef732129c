//! Schema creation
//!
//! All statements are idempotent (`CREATE TABLE IF NOT EXISTS`,
//! `INSERT OR REPLACE`), so re-running the extractor against an existing
//! database is safe.

use crate::catalog::{self, SensorDef};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Quote an identifier for safe interpolation into DDL/DML
///
/// Needed for column names that arrive from external files (metadata.csv
/// headers); catalog names are static but go through the same path.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Create the full schema: participants, one table per sensor, dictionary
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_participants_table(pool).await?;

    for def in catalog::CATALOG.values() {
        create_sensor_table(pool, def).await?;
    }

    create_data_dictionary_table(pool).await?;
    refresh_data_dictionary(pool).await?;

    info!("Database schema ready ({} sensor tables)", catalog::CATALOG.len());
    Ok(())
}

async fn create_participants_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS participants (
            participant_id TEXT PRIMARY KEY,
            low_session INTEGER,
            medium_session INTEGER,
            high_session INTEGER,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sensor_table(pool: &SqlitePool, def: &SensorDef) -> Result<()> {
    let mut columns_sql: Vec<String> = def
        .columns
        .iter()
        .map(|col| format!("{} {}", quote_ident(col), catalog::column_sql_type(col)))
        .collect();

    columns_sql.push("participant_id TEXT".to_string());
    columns_sql.push("session_id INTEGER".to_string());
    columns_sql.push("created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP".to_string());

    let create_sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  id INTEGER PRIMARY KEY AUTOINCREMENT,\n  {},\n  FOREIGN KEY (participant_id) REFERENCES participants (participant_id)\n)",
        quote_ident(def.name),
        columns_sql.join(",\n  ")
    );

    sqlx::query(&create_sql).execute(pool).await?;

    Ok(())
}

async fn create_data_dictionary_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS data_dictionary (
            sensor_name TEXT PRIMARY KEY,
            description TEXT,
            units TEXT,
            sampling_rate TEXT,
            sensor_type TEXT,
            columns TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Mirror the static catalog into the data_dictionary table
///
/// Lets the query service enumerate sensors at runtime without linking
/// against the catalog.
pub async fn refresh_data_dictionary(pool: &SqlitePool) -> Result<()> {
    for def in catalog::CATALOG.values() {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO data_dictionary
            (sensor_name, description, units, sampling_rate, sensor_type, columns)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(def.name)
        .bind(def.description)
        .bind(def.units)
        .bind(def.sampling_rate)
        .bind(def.sensor_type)
        .bind(def.columns.join(","))
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_database(&dir.path().join("physio.db")).await.unwrap();
        (dir, pool)
    }

    async fn table_names(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn creates_one_table_per_sensor_plus_meta() {
        let (_dir, pool) = test_pool().await;
        create_schema(&pool).await.unwrap();

        let tables = table_names(&pool).await;
        assert!(tables.contains(&"participants".to_string()));
        assert!(tables.contains(&"data_dictionary".to_string()));
        for name in catalog::sensor_names() {
            assert!(tables.contains(&name.to_string()), "missing table: {}", name);
        }
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let (_dir, pool) = test_pool().await;
        create_schema(&pool).await.unwrap();
        let first = table_names(&pool).await;

        create_schema(&pool).await.unwrap();
        let second = table_names(&pool).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn dictionary_mirrors_catalog() {
        let (_dir, pool) = test_pool().await;
        create_schema(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM data_dictionary")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count as usize, catalog::CATALOG.len());

        let columns: String = sqlx::query_scalar(
            "SELECT columns FROM data_dictionary WHERE sensor_name = 'wrist_hr'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(columns, "timestamp,hr");
    }

    #[tokio::test]
    async fn sensor_columns_follow_type_rule() {
        let (_dir, pool) = test_pool().await;
        create_schema(&pool).await.unwrap();

        // PRAGMA table_info: (cid, name, type, notnull, dflt_value, pk)
        let info: Vec<(i64, String, String, i64, Option<String>, i64)> =
            sqlx::query_as("PRAGMA table_info(muse_blinks)")
                .fetch_all(&pool)
                .await
                .unwrap();

        let type_of = |col: &str| {
            info.iter()
                .find(|row| row.1 == col)
                .map(|row| row.2.clone())
                .unwrap_or_else(|| panic!("missing column {}", col))
        };

        assert_eq!(type_of("timestamp"), "REAL");
        assert_eq!(type_of("is_blink"), "INTEGER");
        assert_eq!(type_of("participant_id"), "TEXT");
        assert_eq!(type_of("session_id"), "INTEGER");
    }
}
