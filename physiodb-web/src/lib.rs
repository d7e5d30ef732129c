//! physiodb-web library - read-only query service over the sensor store
//!
//! Serves a small JSON API plus an embedded browser UI. Never writes to the
//! database; connections are opened read-only by `main`.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod queries;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/health", get(api::health_check))
        .route("/api/stats", get(api::get_stats))
        .route("/api/participants", get(api::get_participants))
        .route("/api/sensors", get(api::get_sensors))
        .route("/api/sensor/:name/summary", get(api::get_sensor_summary))
        .route("/api/sensor/:name/data", get(api::get_sensor_data))
        .route("/api/participant/:id/overview", get(api::get_participant_overview))
        .route("/api/search", get(api::search_data))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
