//! Query service over the populated sensor store
//!
//! Stateless async functions over a `SqlitePool`, returning plain serde
//! structs. Outcomes are kept structurally distinct: `Ok(None)` is the
//! not-found sentinel, `SearchOutcome::Error` is caller misuse, and `Err`
//! is an infrastructure failure. The HTTP layer maps these to 404, 400,
//! and 500 respectively.

use physiodb_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, ValueRef};

/// Default row cap for data queries
pub const DEFAULT_DATA_LIMIT: i64 = 1000;

/// One participant with their session-intensity assignments
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Participant {
    pub participant_id: String,
    pub low_session: Option<i64>,
    pub medium_session: Option<i64>,
    pub high_session: Option<i64>,
}

/// One sensor as listed in the data dictionary
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SensorEntry {
    pub sensor_name: String,
    pub description: Option<String>,
    pub columns: Option<String>,
}

/// Per-(participant, session) record count for one sensor
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ParticipantSessionCount {
    pub participant_id: Option<String>,
    pub session_id: Option<i64>,
    pub record_count: i64,
}

/// Record breakdown for one sensor table
#[derive(Debug, Serialize)]
pub struct SensorSummary {
    pub sensor_name: String,
    pub total_records: i64,
    pub participant_stats: Vec<ParticipantSessionCount>,
}

/// Raw rows from one sensor table
#[derive(Debug, Serialize)]
pub struct SensorData {
    pub sensor_name: String,
    pub columns: Vec<String>,
    pub data: Vec<Value>,
    pub total_records: usize,
}

/// Per-session record count within one sensor
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SessionCount {
    pub session_id: Option<i64>,
    pub record_count: i64,
}

/// One sensor's presence in a participant's data
#[derive(Debug, Serialize)]
pub struct SensorSessionStats {
    pub sensor_name: String,
    pub description: Option<String>,
    pub session_stats: Vec<SessionCount>,
}

/// Cross-sensor overview for one participant
#[derive(Debug, Serialize)]
pub struct ParticipantOverview {
    pub participant_id: String,
    pub participant_info: Participant,
    pub sensor_stats: Vec<SensorSessionStats>,
}

/// Whole-database statistics
#[derive(Debug, Serialize)]
pub struct DatabaseStats {
    pub total_participants: i64,
    pub total_sensor_types: i64,
    pub sensor_stats: Vec<TableCount>,
}

/// Row count for one sensor table
#[derive(Debug, Serialize)]
pub struct TableCount {
    pub sensor_name: String,
    pub record_count: i64,
}

/// Optional filters for data queries and the generic search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub sensor_name: Option<String>,
    pub participant_id: Option<String>,
    pub session_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Outcome of the generic dispatch-by-type search
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Participants(Vec<Participant>),
    Sensors(Vec<SensorEntry>),
    Data(SensorData),
    NotFound,
    Error { error: String },
}

/// List all participants ordered by identifier
///
/// Returns an empty list when the participants table is absent or empty.
pub async fn list_participants(pool: &SqlitePool) -> Result<Vec<Participant>> {
    if !table_exists(pool, "participants").await? {
        return Ok(Vec::new());
    }

    let participants = sqlx::query_as::<_, Participant>(
        r#"
        SELECT participant_id, low_session, medium_session, high_session
        FROM participants
        ORDER BY participant_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(participants)
}

/// List available sensors from the data dictionary
pub async fn list_sensors(pool: &SqlitePool) -> Result<Vec<SensorEntry>> {
    if !table_exists(pool, "data_dictionary").await? {
        return Ok(Vec::new());
    }

    let sensors = sqlx::query_as::<_, SensorEntry>(
        r#"
        SELECT sensor_name, description, columns
        FROM data_dictionary
        ORDER BY sensor_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(sensors)
}

/// Record/participant breakdown for one sensor table
///
/// `None` when no table of that name exists.
pub async fn sensor_summary(pool: &SqlitePool, sensor_name: &str) -> Result<Option<SensorSummary>> {
    if !is_valid_table_name(sensor_name) || !table_exists(pool, sensor_name).await? {
        return Ok(None);
    }

    let total_records: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", sensor_name))
            .fetch_one(pool)
            .await?;

    let participant_stats = sqlx::query_as::<_, ParticipantSessionCount>(&format!(
        "SELECT participant_id, session_id, COUNT(*) as record_count
         FROM {}
         GROUP BY participant_id, session_id
         ORDER BY participant_id, session_id",
        sensor_name
    ))
    .fetch_all(pool)
    .await?;

    Ok(Some(SensorSummary {
        sensor_name: sensor_name.to_string(),
        total_records,
        participant_stats,
    }))
}

/// Raw rows from one sensor table, optionally filtered
///
/// Filters are conjunctive; rows are ordered by ascending timestamp and
/// truncated (not rejected) at `limit`.
pub async fn sensor_data(
    pool: &SqlitePool,
    sensor_name: &str,
    participant_id: Option<&str>,
    session_id: Option<i64>,
    limit: i64,
) -> Result<Option<SensorData>> {
    if !is_valid_table_name(sensor_name) || !table_exists(pool, sensor_name).await? {
        return Ok(None);
    }

    let columns = table_columns(pool, sensor_name).await?;

    let mut sql = format!("SELECT * FROM {} WHERE 1=1", sensor_name);
    if participant_id.is_some() {
        sql.push_str(" AND participant_id = ?");
    }
    if session_id.is_some() {
        sql.push_str(" AND session_id = ?");
    }
    sql.push_str(" ORDER BY timestamp LIMIT ?");

    let mut query = sqlx::query(&sql);
    if let Some(participant_id) = participant_id {
        query = query.bind(participant_id);
    }
    if let Some(session_id) = session_id {
        query = query.bind(session_id);
    }
    query = query.bind(limit);

    let rows = query.fetch_all(pool).await?;

    let data: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), row_value(row, i));
            }
            Value::Object(record)
        })
        .collect();

    let total_records = data.len();
    Ok(Some(SensorData {
        sensor_name: sensor_name.to_string(),
        columns,
        data,
        total_records,
    }))
}

/// Cross-sensor overview for one participant
///
/// Sensors with zero rows for the participant are omitted. `None` when the
/// identifier is absent from the participants table.
pub async fn participant_overview(
    pool: &SqlitePool,
    participant_id: &str,
) -> Result<Option<ParticipantOverview>> {
    if !table_exists(pool, "participants").await? {
        return Ok(None);
    }

    let participant = sqlx::query_as::<_, Participant>(
        r#"
        SELECT participant_id, low_session, medium_session, high_session
        FROM participants
        WHERE participant_id = ?
        "#,
    )
    .bind(participant_id)
    .fetch_optional(pool)
    .await?;

    let Some(participant) = participant else {
        return Ok(None);
    };

    let mut sensor_stats = Vec::new();
    for sensor in list_sensors(pool).await? {
        if !is_valid_table_name(&sensor.sensor_name)
            || !table_exists(pool, &sensor.sensor_name).await?
        {
            continue;
        }

        let session_stats = sqlx::query_as::<_, SessionCount>(&format!(
            "SELECT session_id, COUNT(*) as record_count
             FROM {}
             WHERE participant_id = ?
             GROUP BY session_id
             ORDER BY session_id",
            sensor.sensor_name
        ))
        .bind(participant_id)
        .fetch_all(pool)
        .await?;

        if !session_stats.is_empty() {
            sensor_stats.push(SensorSessionStats {
                sensor_name: sensor.sensor_name,
                description: sensor.description,
                session_stats,
            });
        }
    }

    Ok(Some(ParticipantOverview {
        participant_id: participant_id.to_string(),
        participant_info: participant,
        sensor_stats,
    }))
}

/// Generic dispatch-by-type search
///
/// Caller misuse (missing `sensor_name` for a data search, unknown
/// `query_type`) comes back as `SearchOutcome::Error`, never as `Err`.
pub async fn search(
    pool: &SqlitePool,
    query_type: &str,
    params: &SearchParams,
) -> Result<SearchOutcome> {
    match query_type {
        "participants" => Ok(SearchOutcome::Participants(list_participants(pool).await?)),
        "sensors" => Ok(SearchOutcome::Sensors(list_sensors(pool).await?)),
        "data" => {
            let Some(sensor_name) = params.sensor_name.as_deref() else {
                return Ok(SearchOutcome::Error {
                    error: "sensor_name is required".to_string(),
                });
            };

            let data = sensor_data(
                pool,
                sensor_name,
                params.participant_id.as_deref(),
                params.session_id,
                params.limit.unwrap_or(DEFAULT_DATA_LIMIT),
            )
            .await?;

            match data {
                Some(data) => Ok(SearchOutcome::Data(data)),
                None => Ok(SearchOutcome::NotFound),
            }
        }
        other => Ok(SearchOutcome::Error {
            error: format!("Invalid query type: {}", other),
        }),
    }
}

/// Whole-database statistics
///
/// Covers every user table except the two meta tables, sorted by record
/// count descending.
pub async fn database_stats(pool: &SqlitePool) -> Result<DatabaseStats> {
    let total_participants = count_if_exists(pool, "participants").await?;
    let total_sensor_types = count_if_exists(pool, "data_dictionary").await?;

    let tables: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite_%'
          AND name NOT IN ('participants', 'data_dictionary')
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut sensor_stats = Vec::new();
    for table in tables {
        if !is_valid_table_name(&table) {
            continue;
        }
        let count: std::result::Result<i64, sqlx::Error> =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(pool)
                .await;
        // A table that cannot be counted is simply left out
        if let Ok(record_count) = count {
            sensor_stats.push(TableCount {
                sensor_name: table,
                record_count,
            });
        }
    }

    sensor_stats.sort_by(|a, b| {
        b.record_count
            .cmp(&a.record_count)
            .then_with(|| a.sensor_name.cmp(&b.sensor_name))
    });

    Ok(DatabaseStats {
        total_participants,
        total_sensor_types,
        sensor_stats,
    })
}

async fn count_if_exists(pool: &SqlitePool, table: &str) -> Result<i64> {
    if !table_exists(pool, table).await? {
        return Ok(0);
    }
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let found: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Validate a table name before interpolation (SQL injection guard)
fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Column names for a table, in declaration order
async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(pool)
        .await?;

    // PRAGMA table_info: (cid, name, type, notnull, dflt_value, pk)
    Ok(rows.iter().map(|row| row.get::<String, _>(1)).collect())
}

/// Convert one SQLite cell to a JSON value
fn row_value(row: &SqliteRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => Value::Null,
        Ok(_) => row
            .try_get::<i64, _>(index)
            .map(Value::from)
            .or_else(|_| row.try_get::<f64, _>(index).map(Value::from))
            .or_else(|_| row.try_get::<String, _>(index).map(Value::from))
            .unwrap_or(Value::Null),
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_validation() {
        assert!(is_valid_table_name("wrist_hr"));
        assert!(is_valid_table_name("forehead_eeg_raw"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("wrist_hr; DROP TABLE participants"));
        assert!(!is_valid_table_name("wrist-hr"));
    }
}
