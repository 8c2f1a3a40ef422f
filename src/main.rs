use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use wifidiag::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable; waiting for Ctrl-C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(name = version::NAME, version = version::VERSION, "Starting");

    let probes = probes::Probes::system(&app_config)?;
    let sampler = Arc::new(sampler::DiagnosticsSampler::new(
        probes,
        sampler::SamplerConfig::from_app_config(&app_config),
    ));
    sampler.start();

    let ws_state_connections = Arc::new(AtomicUsize::new(0));
    let app = routes::app(sampler.clone(), ws_state_connections, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }
    sampler.stop().await;

    Ok(())
}
