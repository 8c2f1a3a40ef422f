// HTTP handlers: version, state, history, on-demand diagnostics

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{AppState, StateReport};
use crate::sampler::SamplerError;
use crate::version::{NAME, VERSION};

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
        .into_response()
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/state: latest snapshot with its quality grade and tips.
pub(super) async fn state_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.sampler.snapshot();
    Json(StateReport::new(&snapshot)).into_response()
}

pub(super) async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sampler.history_summary())
}

pub(super) async fn reset_history_handler(State(state): State<AppState>) -> StatusCode {
    state.sampler.reset_history();
    StatusCode::NO_CONTENT
}

/// POST /api/speedtest: blocks until the test finishes; 409 if one is already running.
pub(super) async fn speed_test_handler(State(state): State<AppState>) -> Response {
    match state.sampler.run_speed_test().await {
        Ok(result) => Json(result).into_response(),
        Err(e @ SamplerError::SpeedTestInProgress) => {
            tracing::debug!(error = %e, "speed test request rejected");
            error_response(StatusCode::CONFLICT, e)
        }
    }
}

pub(super) async fn scan_handler(State(state): State<AppState>) -> Response {
    match state.sampler.scan_interference().await {
        Some(result) => Json(result).into_response(),
        None => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "channel scan unavailable on this host",
        ),
    }
}

pub(super) async fn portal_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sampler.check_captive_portal().await)
}
