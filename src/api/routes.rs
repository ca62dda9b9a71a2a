//! API route definitions
//!
//! - /api/detect - Presence reports from the detector
//! - /api/reset - Return the signal to GO
//! - /api/traffic_light_status - Phase, countdown and presence
//! - /esp - One-letter phase code for the lamp driver
//! - /ws - Observer WebSocket
//! - /health - Liveness

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::defaults;

use super::handlers::{self, ApiState};

/// Routes nested under `/api`
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/detect", post(handlers::post_detect))
        .route("/reset", post(handlers::post_reset))
        .route("/traffic_light_status", get(handlers::get_traffic_light_status))
        .layer(RequestBodyLimitLayer::new(defaults::MAX_REPORT_BODY_BYTES))
        .with_state(state)
}

/// Device, observer and health routes at root level
pub fn root_routes(state: ApiState) -> Router {
    Router::new()
        .route("/esp", get(handlers::get_device_signal))
        .route("/ws", get(handlers::observer_socket))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
