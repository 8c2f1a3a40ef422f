use serde::Deserialize;

use crate::history::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub probes: ProbesConfig,
    #[serde(default)]
    pub speed_test: SpeedTestConfig,
    #[serde(default)]
    pub captive_portal: CaptivePortalConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// How often to log sampler stats (ticks, probe failures, state subscribers) at INFO level.
    pub stats_log_interval_secs: u64,
    /// Samples kept per metric history.
    pub history_capacity: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            stats_log_interval_secs: 60,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
    /// Host pinged for internet reachability.
    pub internet_host: String,
    /// Hostname resolved to time DNS.
    pub dns_test_host: String,
    pub ping_count: u32,
    /// Per echo request.
    pub ping_timeout_ms: u64,
    /// Upper bound for any single probe within a tick.
    pub probe_timeout_ms: u64,
    /// Pin the wireless interface (e.g. "wlan0"); detected when unset.
    pub wifi_interface: Option<String>,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            internet_host: "1.1.1.1".into(),
            dns_test_host: "apple.com".into(),
            ping_count: 3,
            ping_timeout_ms: 1000,
            probe_timeout_ms: 3000,
            wifi_interface: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeedTestConfig {
    pub download_url: String,
    pub upload_url: String,
    pub upload_bytes: usize,
    /// Per transfer.
    pub timeout_secs: u64,
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            download_url: "https://speed.cloudflare.com/__down?bytes=10000000".into(),
            upload_url: "https://speed.cloudflare.com/__up".into(),
            upload_bytes: 1_000_000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptivePortalConfig {
    pub url: String,
    /// Marker the known-good page contains when nothing intercepts it.
    pub expected_body: String,
    pub timeout_secs: u64,
}

impl Default for CaptivePortalConfig {
    fn default() -> Self {
        Self {
            url: "http://captive.apple.com/hotspot-detect.html".into(),
            expected_body: "Success".into(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    /// Ping interval for WebSocket connection health.
    pub ws_ping_interval_secs: u64,
    /// Max time to wait for a send before treating the client as dead.
    pub ws_send_timeout_secs: u64,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            ws_ping_interval_secs: 30,
            ws_send_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.history_capacity > 0,
            "monitoring.history_capacity must be > 0, got {}",
            self.monitoring.history_capacity
        );
        anyhow::ensure!(
            !self.probes.internet_host.is_empty(),
            "probes.internet_host must be non-empty"
        );
        anyhow::ensure!(
            !self.probes.dns_test_host.is_empty(),
            "probes.dns_test_host must be non-empty"
        );
        anyhow::ensure!(
            self.probes.ping_count > 0,
            "probes.ping_count must be > 0, got {}",
            self.probes.ping_count
        );
        anyhow::ensure!(
            self.probes.ping_timeout_ms > 0,
            "probes.ping_timeout_ms must be > 0, got {}",
            self.probes.ping_timeout_ms
        );
        anyhow::ensure!(
            self.probes.probe_timeout_ms > 0,
            "probes.probe_timeout_ms must be > 0, got {}",
            self.probes.probe_timeout_ms
        );
        anyhow::ensure!(
            self.probes.ping_timeout_ms < self.probes.probe_timeout_ms,
            "probes.ping_timeout_ms ({}) must be below probes.probe_timeout_ms ({})",
            self.probes.ping_timeout_ms,
            self.probes.probe_timeout_ms
        );
        anyhow::ensure!(
            self.speed_test.upload_bytes > 0,
            "speed_test.upload_bytes must be > 0, got {}",
            self.speed_test.upload_bytes
        );
        anyhow::ensure!(
            self.speed_test.timeout_secs > 0,
            "speed_test.timeout_secs must be > 0, got {}",
            self.speed_test.timeout_secs
        );
        anyhow::ensure!(
            self.captive_portal.timeout_secs > 0,
            "captive_portal.timeout_secs must be > 0, got {}",
            self.captive_portal.timeout_secs
        );
        anyhow::ensure!(
            self.publishing.ws_send_timeout_secs > 0,
            "publishing.ws_send_timeout_secs must be > 0, got {}",
            self.publishing.ws_send_timeout_secs
        );
        anyhow::ensure!(
            self.publishing.ws_ping_interval_secs > 0,
            "publishing.ws_ping_interval_secs must be > 0, got {}",
            self.publishing.ws_ping_interval_secs
        );
        Ok(())
    }
}
