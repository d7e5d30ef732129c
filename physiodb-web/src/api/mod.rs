//! HTTP API handlers for physiodb-web

mod handlers;
mod health;
mod ui;

pub use handlers::{
    get_participant_overview, get_participants, get_sensor_data, get_sensor_summary, get_sensors,
    get_stats, search_data, ApiError,
};
pub use health::health_check;
pub use ui::serve_index;
