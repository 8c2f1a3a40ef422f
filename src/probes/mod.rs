// Probe adapters: the narrow seams between the sampler and the platform.
// Every adapter turns its own failures into the probe's empty value; nothing
// past this boundary sees an error.

mod dns;
mod gateway;
mod ping;
mod portal;
mod scan;
mod speed;
mod wifi;

pub use dns::SystemDnsProbe;
pub use gateway::SystemGatewayResolver;
pub use ping::SystemPinger;
pub use portal::HttpCaptivePortalProbe;
pub use scan::SystemChannelScanner;
pub use speed::HttpSpeedProbe;
pub use wifi::SystemWifiLink;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{CaptivePortalStatus, ChannelScan, DnsMetrics, PingMetrics, WifiMetrics};

/// Reads the current radio link. Local and cheap; no network I/O.
pub trait WifiLink: Send + Sync {
    fn current_metrics(&self) -> WifiMetrics;
}

#[async_trait]
pub trait GatewayResolver: Send + Sync {
    async fn default_gateway(&self) -> Option<String>;
}

#[async_trait]
pub trait Pinger: Send + Sync {
    /// Sends `count` echo requests, each waiting at most `timeout`.
    async fn ping(&self, host: &str, count: u32, timeout: Duration) -> PingMetrics;
}

#[async_trait]
pub trait DnsProbe: Send + Sync {
    async fn lookup_time(&self, hostname: &str) -> DnsMetrics;
}

/// Throughput in Mbps; 0 on any failure.
#[async_trait]
pub trait SpeedProbe: Send + Sync {
    async fn download_mbps(&self) -> f64;
    async fn upload_mbps(&self) -> f64;
}

#[async_trait]
pub trait ChannelScanner: Send + Sync {
    /// `None` when the adapter is missing or scanning is not permitted.
    async fn scan(&self) -> Option<ChannelScan>;
}

#[async_trait]
pub trait CaptivePortalProbe: Send + Sync {
    async fn check(&self) -> CaptivePortalStatus;
}

/// Failures inside an adapter. Logged, then mapped to the empty value.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    ExitStatus {
        command: String,
        status: std::process::ExitStatus,
    },
    #[error("{0} timed out")]
    Timeout(String),
    #[error("unparsable output from {0}")]
    Parse(String),
    #[error("no wireless interface found")]
    NoInterface,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// All collaborators the sampler and the on-demand actions need.
#[derive(Clone)]
pub struct Probes {
    pub wifi: Arc<dyn WifiLink>,
    pub gateway: Arc<dyn GatewayResolver>,
    pub pinger: Arc<dyn Pinger>,
    pub dns: Arc<dyn DnsProbe>,
    pub speed: Arc<dyn SpeedProbe>,
    pub scanner: Arc<dyn ChannelScanner>,
    pub portal: Arc<dyn CaptivePortalProbe>,
}

impl Probes {
    /// Platform implementations configured from `config`.
    pub fn system(config: &AppConfig) -> Result<Self, ProbeError> {
        let probe_timeout = Duration::from_millis(config.probes.probe_timeout_ms);
        Ok(Self {
            wifi: Arc::new(SystemWifiLink::new(
                config.probes.wifi_interface.clone(),
                probe_timeout,
            )),
            gateway: Arc::new(SystemGatewayResolver::new()),
            pinger: Arc::new(SystemPinger::new()),
            dns: Arc::new(SystemDnsProbe::new(probe_timeout)),
            speed: Arc::new(HttpSpeedProbe::new(&config.speed_test)?),
            scanner: Arc::new(SystemChannelScanner::new(probe_timeout * 4)),
            portal: Arc::new(HttpCaptivePortalProbe::new(&config.captive_portal)?),
        })
    }
}

/// Captured stdout of a finished command.
pub(crate) struct CommandOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
}

/// Runs `program` with a hard deadline. The child is killed if the deadline
/// passes or the future is dropped.
pub(crate) async fn run_command(
    program: &str,
    args: &[&str],
    deadline: Duration,
) -> Result<CommandOutput, ProbeError> {
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(deadline, child)
        .await
        .map_err(|_| ProbeError::Timeout(program.to_string()))?
        .map_err(|source| ProbeError::Spawn {
            command: program.to_string(),
            source,
        })?;
    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}
