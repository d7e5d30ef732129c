//! Integration tests for the physiodb-web API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Catalog listings (/api/sensors, /api/participants, /api/stats)
//! - Sensor summary and data with filters and limits
//! - Participant overview
//! - Search dispatch and its 400/404 mappings

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use physiodb_common::db;
use physiodb_web::{build_router, AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create a scratch database with the full schema
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = db::open_database(&dir.path().join("physio.db"))
        .await
        .expect("Should create test database");
    db::create_schema(&pool).await.expect("Should create schema");
    (dir, pool)
}

fn setup_app(db: SqlitePool) -> axum::Router {
    let state = AppState::new(db);
    build_router(state)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn seed_participant(pool: &SqlitePool, id: &str) {
    sqlx::query(
        "INSERT INTO participants (participant_id, low_session, medium_session, high_session)
         VALUES (?, 1, 2, 3)",
    )
    .bind(id)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_hr(pool: &SqlitePool, participant: &str, session: i64, timestamp: f64, hr: f64) {
    sqlx::query(
        "INSERT INTO wrist_hr (timestamp, hr, participant_id, session_id) VALUES (?, ?, ?, ?)",
    )
    .bind(timestamp)
    .bind(hr)
    .bind(participant)
    .bind(session)
    .execute(pool)
    .await
    .unwrap();
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "physiodb-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_index_serves_html() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app.oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<html"));
}

// =============================================================================
// Listing Endpoints
// =============================================================================

#[tokio::test]
async fn test_participants_empty_then_seeded() {
    let (_dir, pool) = setup_test_db().await;

    let app = setup_app(pool.clone());
    let response = app
        .oneshot(test_request("GET", "/api/participants"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    seed_participant(&pool, "101").await;
    seed_participant(&pool, "102").await;

    let app = setup_app(pool);
    let response = app
        .oneshot(test_request("GET", "/api/participants"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["participant_id"], "101");
    assert_eq!(list[0]["low_session"], 1);
}

#[tokio::test]
async fn test_sensors_listing_includes_catalog_entries() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/sensors"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), physiodb_common::catalog::CATALOG.len());

    let hr = list
        .iter()
        .find(|s| s["sensor_name"] == "wrist_hr")
        .expect("wrist_hr should be listed");
    assert!(hr["description"].is_string());
    assert_eq!(hr["columns"], "timestamp,hr");
}

#[tokio::test]
async fn test_stats_endpoint_structure() {
    let (_dir, pool) = setup_test_db().await;
    seed_participant(&pool, "101").await;
    seed_hr(&pool, "101", 1, 1.0, 60.0).await;
    seed_hr(&pool, "101", 1, 2.0, 61.0).await;

    let app = setup_app(pool);
    let response = app
        .oneshot(test_request("GET", "/api/stats"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_participants"], 1);
    let tables = body["sensor_stats"].as_array().unwrap();
    assert_eq!(tables[0]["sensor_name"], "wrist_hr");
    assert_eq!(tables[0]["record_count"], 2);
}

// =============================================================================
// Sensor Summary and Data
// =============================================================================

#[tokio::test]
async fn test_sensor_summary_empty_store() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/sensor/wrist_hr/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["sensor_name"], "wrist_hr");
    assert_eq!(body["total_records"], 0);
    assert_eq!(body["participant_stats"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_sensor_summary_unknown_sensor_is_404() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/sensor/bogus/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("bogus"));
}

#[tokio::test]
async fn test_sensor_data_filters_and_limit() {
    let (_dir, pool) = setup_test_db().await;
    for i in 0..10 {
        seed_hr(&pool, "101", 1, i as f64, 60.0 + i as f64).await;
    }
    seed_hr(&pool, "102", 1, 0.5, 99.0).await;

    let app = setup_app(pool.clone());
    let response = app
        .oneshot(test_request(
            "GET",
            "/api/sensor/wrist_hr/data?participant_id=101&session_id=1&limit=5",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_records"], 5);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    // Ascending timestamps, so the limit keeps the earliest rows
    assert_eq!(rows[0]["timestamp"], 0.0);
    assert_eq!(rows[4]["timestamp"], 4.0);
    assert!(rows.iter().all(|r| r["participant_id"] == "101"));

    // Without an explicit limit the full set (under the default cap) comes back
    let app = setup_app(pool);
    let response = app
        .oneshot(test_request("GET", "/api/sensor/wrist_hr/data"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_records"], 11);
}

#[tokio::test]
async fn test_sensor_data_unknown_sensor_is_404() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/sensor/bogus/data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Participant Overview
// =============================================================================

#[tokio::test]
async fn test_participant_overview() {
    let (_dir, pool) = setup_test_db().await;
    seed_participant(&pool, "101").await;
    seed_participant(&pool, "103").await;
    seed_hr(&pool, "101", 1, 1.0, 60.0).await;

    let app = setup_app(pool.clone());
    let response = app
        .oneshot(test_request("GET", "/api/participant/101/overview"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["participant_info"]["participant_id"], "101");
    let stats = body["sensor_stats"].as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["sensor_name"], "wrist_hr");

    // Known participant with no sensor rows still gets a 200
    let app = setup_app(pool.clone());
    let response = app
        .oneshot(test_request("GET", "/api/participant/103/overview"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["sensor_stats"].as_array().unwrap().len(), 0);

    let app = setup_app(pool);
    let response = app
        .oneshot(test_request("GET", "/api/participant/999/overview"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("999"));
}

// =============================================================================
// Search Dispatch
// =============================================================================

#[tokio::test]
async fn test_search_participants_and_sensors() {
    let (_dir, pool) = setup_test_db().await;
    seed_participant(&pool, "101").await;

    let app = setup_app(pool.clone());
    let response = app
        .oneshot(test_request("GET", "/api/search?type=participants"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let app = setup_app(pool);
    let response = app
        .oneshot(test_request("GET", "/api/search?type=sensors"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body.as_array().unwrap().len(),
        physiodb_common::catalog::CATALOG.len()
    );
}

#[tokio::test]
async fn test_search_data_requires_sensor_name() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/search?type=data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("sensor_name"));
}

#[tokio::test]
async fn test_search_unknown_type_is_400() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/search?type=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid query type"));
}

#[tokio::test]
async fn test_search_data_unknown_sensor_is_404() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request("GET", "/api/search?type=data&sensor_name=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_data_with_filters() {
    let (_dir, pool) = setup_test_db().await;
    seed_hr(&pool, "101", 1, 1.0, 60.0).await;
    seed_hr(&pool, "101", 2, 2.0, 61.0).await;

    let app = setup_app(pool);
    let response = app
        .oneshot(test_request(
            "GET",
            "/api/search?type=data&sensor_name=wrist_hr&participant_id=101&session_id=2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_records"], 1);
    assert_eq!(body["data"][0]["session_id"], 2);
}
