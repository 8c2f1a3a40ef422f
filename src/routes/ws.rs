// WebSocket handler: pushes every new snapshot to the client

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio::time::{Duration, timeout};

use super::{AppState, StateReport};
use crate::models::NetworkState;

/// Decrements ws_state connection count on drop (connect = +1, drop = -1).
struct WsStateGuard(Arc<AtomicUsize>);

impl Drop for WsStateGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

struct StreamTimings {
    ping_interval: Duration,
    send_timeout: Duration,
}

pub(super) async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let rx = state.sampler.subscribe();
    let conn_count = state.ws_state_connections.clone();
    let timings = StreamTimings {
        ping_interval: Duration::from_secs(state.config.publishing.ws_ping_interval_secs),
        send_timeout: Duration::from_secs(state.config.publishing.ws_send_timeout_secs),
    };
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_state(socket, rx, conn_count, timings).await {
            tracing::info!("State stream error: {}", e);
        }
    })
}

/// Sends a report; `false` when the client is gone or too slow.
async fn send_report(
    socket: &mut WebSocket,
    state: &NetworkState,
    send_timeout: Duration,
) -> anyhow::Result<bool> {
    let json = serde_json::to_string(&StateReport::new(state))?;
    let r = timeout(send_timeout, socket.send(Message::Text(json.into()))).await;
    Ok(!(r.is_err() || r.unwrap_or(Ok(())).is_err()))
}

async fn stream_state(
    mut socket: WebSocket,
    mut rx: watch::Receiver<Arc<NetworkState>>,
    conn_count: Arc<AtomicUsize>,
    timings: StreamTimings,
) -> anyhow::Result<()> {
    let clients = conn_count.fetch_add(1, Ordering::Relaxed) + 1;
    let _guard = WsStateGuard(conn_count);
    tracing::info!(ws_state_clients = clients, "Client connected to State stream");

    // Current snapshot first, so a client never waits a full tick for data.
    let current = Arc::clone(&rx.borrow_and_update());
    if !send_report(&mut socket, &current, timings.send_timeout).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(timings.ping_interval);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = Arc::clone(&rx.borrow_and_update());
                if !send_report(&mut socket, &snapshot, timings.send_timeout).await? {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(timings.send_timeout, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
