//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info, warn};

use crate::{
    display::{selection_summary, DurationSelection},
    engine::Phase,
    state::{AppState, TimerOpError},
};

use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Map a failed timer operation to an HTTP status
fn op_error_status(op: &str, err: TimerOpError) -> StatusCode {
    match err {
        TimerOpError::Transition(e) => {
            warn!("Rejected {} request: {}", op, e);
            StatusCode::CONFLICT
        }
        TimerOpError::Internal(e) => {
            error!("Failed to {} timer: {}", op, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Handle POST /timer/start - Begin a countdown for the selected duration
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<DurationSelection>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if !selection.is_valid() {
        warn!(
            "Rejected start request: selection out of range ({}h {}m {}s)",
            selection.hours, selection.minutes, selection.seconds
        );
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let duration = selection.total_seconds();
    match state.start_timer(duration) {
        Ok(timer) => {
            let message = if timer.phase == Phase::Idle {
                // Zero duration is a benign no-op
                "Zero duration selected, timer left idle".to_string()
            } else {
                info!("Start endpoint called - countdown running");
                format!("Countdown started for {}", selection_summary(duration))
            };
            Ok(Json(ApiResponse::ok(message, timer)))
        }
        Err(e) => Err(op_error_status("start", e)),
    }
}

/// Handle POST /timer/pause - Pause the running countdown
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.pause_timer() {
        Ok(timer) => {
            info!("Pause endpoint called - countdown paused");
            Ok(Json(ApiResponse::ok("Countdown paused".to_string(), timer)))
        }
        Err(e) => Err(op_error_status("pause", e)),
    }
}

/// Handle POST /timer/resume - Resume the paused countdown
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.resume_timer() {
        Ok(timer) => {
            info!("Resume endpoint called - countdown resumed");
            Ok(Json(ApiResponse::ok("Countdown resumed".to_string(), timer)))
        }
        Err(e) => Err(op_error_status("resume", e)),
    }
}

/// Handle POST /timer/reset - Return the timer to idle from any phase
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset_timer() {
        Ok(timer) => {
            info!("Reset endpoint called - timer idle");
            Ok(Json(ApiResponse::ok("Timer reset".to_string(), timer)))
        }
        Err(e) => Err(op_error_status("reset", e)),
    }
}

/// Handle GET /status - Return the current timer snapshot and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.timer_snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
