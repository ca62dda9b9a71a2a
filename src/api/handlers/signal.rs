//! Signal endpoints: detection ingress, reset, status, device query, health

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::envelope::ApiErrorResponse;
use crate::types::{DetectionReport, Phase};

use super::ApiState;

// ============================================================================
// Detection Ingress
// ============================================================================

/// Reply to a detection report, reflecting state after it was applied
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub success: bool,
    pub detected: bool,
    pub count: u32,
    pub current_light: Phase,
    pub time_left: u32,
}

/// POST /api/detect - Apply a presence report from the detector
pub async fn post_detect(
    State(state): State<ApiState>,
    payload: Result<Json<DetectionReport>, JsonRejection>,
) -> Response {
    let report = match payload {
        Ok(Json(report)) => report,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected detection report");
            return ApiErrorResponse::bad_request(rejection.body_text());
        }
    };

    match state.signal.report_detection(report).await {
        Ok(outcome) => Json(DetectResponse {
            success: true,
            detected: report.detected,
            count: report.count,
            current_light: outcome.snapshot.color,
            time_left: outcome.snapshot.time_left,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Reset
// ============================================================================

/// POST /api/reset - Return to GO with a full countdown
pub async fn post_reset(State(state): State<ApiState>) -> Response {
    match state.signal.reset().await {
        Ok(snapshot) => {
            info!(source = "http", "Signal reset requested");
            Json(snapshot).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Status Queries
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TrafficLightStatus {
    pub traffic_light_color: Phase,
    pub time_left: u32,
    pub person_detected: bool,
}

/// GET /api/traffic_light_status - Current phase, countdown and presence
pub async fn get_traffic_light_status(State(state): State<ApiState>) -> Response {
    match state.signal.status().await {
        Ok(status) => Json(TrafficLightStatus {
            traffic_light_color: status.phase,
            time_left: status.countdown,
            person_detected: status.person_detected,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct DeviceSignal {
    /// `R`, `Y` or `G`
    pub signal: &'static str,
}

/// GET /esp - One-letter phase code for the lamp driver
pub async fn get_device_signal(State(state): State<ApiState>) -> Response {
    match state.signal.status().await {
        Ok(status) => Json(DeviceSignal {
            signal: status.phase.device_code(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub observers: usize,
    pub phase: Phase,
}

/// GET /health - Liveness plus a one-line view of the signal
pub async fn get_health(State(state): State<ApiState>) -> Response {
    match state.signal.status().await {
        Ok(status) => Json(HealthResponse {
            status: "ok",
            uptime_seconds: state.started_at.elapsed().as_secs(),
            observers: state.observers.len(),
            phase: status.phase,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
