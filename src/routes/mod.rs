// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::models::{NetworkState, Severity, Tip};
use crate::quality::{ConnectionQuality, Mood};
use crate::sampler::DiagnosticsSampler;
use crate::tips;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sampler: Arc<DiagnosticsSampler>,
    pub(crate) ws_state_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

/// Snapshot plus everything derived from it, as served on /api/state and /ws/state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StateReport<'a> {
    pub(crate) state: &'a NetworkState,
    pub(crate) quality: ConnectionQuality,
    pub(crate) mood: Mood,
    pub(crate) label: &'static str,
    pub(crate) color: &'static str,
    pub(crate) tips: Vec<Tip>,
    pub(crate) worst_severity: Option<Severity>,
}

impl<'a> StateReport<'a> {
    pub(crate) fn new(state: &'a NetworkState) -> Self {
        let quality = ConnectionQuality::classify(state);
        let tips = tips::analyze(&state.wifi, &state.router, &state.internet);
        Self {
            state,
            quality,
            mood: quality.mood(),
            label: quality.label(),
            color: quality.color(),
            worst_severity: tips::worst_severity(&tips),
            tips,
        }
    }
}

pub fn app(
    sampler: Arc<DiagnosticsSampler>,
    ws_state_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        sampler,
        ws_state_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "wifidiag: network diagnostics daemon" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/state", get(http::state_handler)) // GET /api/state
        .route("/api/history", get(http::history_handler)) // GET /api/history
        .route("/api/history/reset", post(http::reset_history_handler)) // POST /api/history/reset
        .route("/api/speedtest", post(http::speed_test_handler)) // POST /api/speedtest
        .route("/api/scan", post(http::scan_handler)) // POST /api/scan
        .route("/api/portal", get(http::portal_handler)) // GET /api/portal
        .route("/ws/state", get(ws::ws_state)) // WS /ws/state
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
