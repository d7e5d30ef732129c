//! Route handlers mapping the query service onto HTTP
//!
//! Sentinels (`Ok(None)`) become 404, caller-input errors become 400, and
//! database failures become 500. All error bodies carry an `error` field.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::queries::{self, SearchOutcome, SearchParams, DEFAULT_DATA_LIMIT};
use crate::AppState;

/// GET /api/stats
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<queries::DatabaseStats>, ApiError> {
    let stats = queries::database_stats(&state.db).await?;
    Ok(Json(stats))
}

/// GET /api/participants
pub async fn get_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<queries::Participant>>, ApiError> {
    let participants = queries::list_participants(&state.db).await?;
    Ok(Json(participants))
}

/// GET /api/sensors
pub async fn get_sensors(
    State(state): State<AppState>,
) -> Result<Json<Vec<queries::SensorEntry>>, ApiError> {
    let sensors = queries::list_sensors(&state.db).await?;
    Ok(Json(sensors))
}

/// GET /api/sensor/:name/summary
pub async fn get_sensor_summary(
    State(state): State<AppState>,
    Path(sensor_name): Path<String>,
) -> Result<Json<queries::SensorSummary>, ApiError> {
    match queries::sensor_summary(&state.db, &sensor_name).await? {
        Some(summary) => Ok(Json(summary)),
        None => Err(ApiError::NotFound(format!(
            "Sensor not found: {}",
            sensor_name
        ))),
    }
}

/// Query parameters for sensor data requests
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub participant_id: Option<String>,
    pub session_id: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_DATA_LIMIT
}

/// GET /api/sensor/:name/data
pub async fn get_sensor_data(
    State(state): State<AppState>,
    Path(sensor_name): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Json<queries::SensorData>, ApiError> {
    let data = queries::sensor_data(
        &state.db,
        &sensor_name,
        query.participant_id.as_deref(),
        query.session_id,
        query.limit,
    )
    .await?;

    match data {
        Some(data) => Ok(Json(data)),
        None => Err(ApiError::NotFound(format!(
            "Sensor not found: {}",
            sensor_name
        ))),
    }
}

/// GET /api/participant/:id/overview
pub async fn get_participant_overview(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<queries::ParticipantOverview>, ApiError> {
    match queries::participant_overview(&state.db, &participant_id).await? {
        Some(overview) => Ok(Json(overview)),
        None => Err(ApiError::NotFound(format!(
            "Participant not found: {}",
            participant_id
        ))),
    }
}

/// Query parameters for the generic search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "type", default = "default_query_type")]
    pub query_type: String,
    pub sensor_name: Option<String>,
    pub participant_id: Option<String>,
    pub session_id: Option<i64>,
    pub limit: Option<i64>,
}

fn default_query_type() -> String {
    "participants".to_string()
}

/// GET /api/search?type=participants|sensors|data
pub async fn search_data(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let params = SearchParams {
        sensor_name: query.sensor_name,
        participant_id: query.participant_id,
        session_id: query.session_id,
        limit: query.limit,
    };

    let outcome = queries::search(&state.db, &query.query_type, &params).await?;
    match outcome {
        SearchOutcome::Error { error } => Err(ApiError::BadRequest(error)),
        SearchOutcome::NotFound => Err(ApiError::NotFound("Sensor not found".to_string())),
        other => Ok(Json(other).into_response()),
    }
}

/// API errors with their HTTP mapping
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<physiodb_common::Error> for ApiError {
    fn from(e: physiodb_common::Error) -> Self {
        match e {
            physiodb_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            physiodb_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
