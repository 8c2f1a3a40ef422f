// Diagnostics sampler: owns the polling loop, the published snapshot and the histories.
// One tick reads the radio link, resolves the gateway, then pings and resolves concurrently.

use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

use crate::config::AppConfig;
use crate::history::{HistorySummary, MetricHistories};
use crate::interference;
use crate::models::{
    CaptivePortalStatus, DnsMetrics, GATEWAY_HOST_LABEL, InterferenceScanResult, NetworkState,
    PingMetrics, SpeedTestMetrics, Tip, WifiMetrics,
};
use crate::probes::Probes;
use crate::quality::ConnectionQuality;
use crate::tips;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("a speed test is already running")]
    SpeedTestInProgress,
}

/// Cadence, targets and timeouts for the sampler.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub sample_interval: Duration,
    /// How often the loop logs its counters at INFO level.
    pub stats_log_interval: Duration,
    pub history_capacity: usize,
    pub internet_host: String,
    pub dns_test_host: String,
    pub ping_count: u32,
    pub ping_timeout: Duration,
    /// Bound on each probe within a tick.
    pub probe_timeout: Duration,
    /// Bound on each speed-test transfer.
    pub speed_test_timeout: Duration,
    pub scan_timeout: Duration,
    pub portal_timeout: Duration,
}

impl SamplerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let probe_timeout = Duration::from_millis(config.probes.probe_timeout_ms);
        Self {
            sample_interval: Duration::from_millis(config.monitoring.sample_interval_ms),
            stats_log_interval: Duration::from_secs(config.monitoring.stats_log_interval_secs),
            history_capacity: config.monitoring.history_capacity,
            internet_host: config.probes.internet_host.clone(),
            dns_test_host: config.probes.dns_test_host.clone(),
            ping_count: config.probes.ping_count,
            ping_timeout: Duration::from_millis(config.probes.ping_timeout_ms),
            probe_timeout,
            speed_test_timeout: Duration::from_secs(config.speed_test.timeout_secs),
            scan_timeout: probe_timeout * 4,
            portal_timeout: Duration::from_secs(config.captive_portal.timeout_secs),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(1),
            stats_log_interval: Duration::from_secs(60),
            history_capacity: crate::history::DEFAULT_HISTORY_CAPACITY,
            internet_host: "1.1.1.1".into(),
            dns_test_host: "apple.com".into(),
            ping_count: 3,
            ping_timeout: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(3),
            speed_test_timeout: Duration::from_secs(30),
            scan_timeout: Duration::from_secs(12),
            portal_timeout: Duration::from_secs(5),
        }
    }
}

/// Link state carried between ticks. Locked for a whole cycle, so cycles never overlap.
#[derive(Debug, Default)]
struct LinkCache {
    gateway: Option<String>,
    was_connected: bool,
    /// Adapter read that outlived its tick. No new read starts until it returns.
    wifi_read: Option<JoinHandle<WifiMetrics>>,
}

/// Raw results of one tick before they are merged into a snapshot.
struct TickSample {
    wifi: WifiMetrics,
    is_connected: bool,
    gateway_ip: Option<String>,
    router: PingMetrics,
    internet: PingMetrics,
    dns: DnsMetrics,
}

struct Shared {
    probes: Probes,
    config: SamplerConfig,
    state_tx: watch::Sender<Arc<NetworkState>>,
    histories: RwLock<MetricHistories>,
    link: tokio::sync::Mutex<LinkCache>,
    speed_test_running: AtomicBool,
    ticks_total: AtomicU64,
    probe_failures_total: AtomicU64,
}

struct LoopHandle {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodic multi-probe sampler. Exclusively owns the current snapshot and the
/// metric histories; everything else reads copies.
pub struct DiagnosticsSampler {
    shared: Arc<Shared>,
    task: Mutex<Option<LoopHandle>>,
}

impl DiagnosticsSampler {
    pub fn new(probes: Probes, config: SamplerConfig) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(NetworkState::empty(&config.internet_host)));
        let histories = RwLock::new(MetricHistories::new(config.history_capacity));
        Self {
            shared: Arc::new(Shared {
                probes,
                config,
                state_tx,
                histories,
                link: tokio::sync::Mutex::new(LinkCache::default()),
                speed_test_running: AtomicBool::new(false),
                ticks_total: AtomicU64::new(0),
                probe_failures_total: AtomicU64::new(0),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.shared.config
    }

    /// Spawns the polling loop. A no-op while a loop is already running.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            tracing::debug!("Sampler already running");
            return;
        }
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_loop(Arc::clone(&self.shared), shutdown_rx));
        *task = Some(LoopHandle {
            shutdown_tx,
            handle,
        });
        tracing::info!(
            sample_interval_ms = self.shared.config.sample_interval.as_millis() as u64,
            "Sampler started"
        );
    }

    /// Stops the loop and waits for it to exit. In-flight probes are dropped.
    /// A no-op when nothing is running.
    pub async fn stop(&self) {
        let running = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(LoopHandle {
            shutdown_tx,
            handle,
        }) = running
        else {
            return;
        };
        let _ = shutdown_tx.send(());
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, operation = "stop_sampler", "sampler task failed");
        }
        tracing::info!("Sampler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Runs one cycle immediately and returns the snapshot it published.
    /// Waits for any cycle already in progress.
    pub async fn tick(&self) -> Arc<NetworkState> {
        self.shared.run_cycle().await
    }

    pub fn snapshot(&self) -> Arc<NetworkState> {
        Arc::clone(&self.shared.state_tx.borrow())
    }

    /// Receiver notified on every snapshot swap.
    pub fn subscribe(&self) -> watch::Receiver<Arc<NetworkState>> {
        self.shared.state_tx.subscribe()
    }

    pub fn histories(&self) -> MetricHistories {
        self.shared.read_histories().clone()
    }

    pub fn history_summary(&self) -> HistorySummary {
        self.shared.read_histories().summary()
    }

    pub fn reset_history(&self) {
        self.shared
            .histories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("Metric histories cleared");
    }

    pub fn quality(&self) -> ConnectionQuality {
        ConnectionQuality::classify(&self.snapshot())
    }

    pub fn tips(&self) -> Vec<Tip> {
        let state = self.snapshot();
        tips::analyze(&state.wifi, &state.router, &state.internet)
    }

    pub fn ticks_total(&self) -> u64 {
        self.shared.ticks_total.load(Ordering::Relaxed)
    }

    /// Download and upload run concurrently, each bounded by the speed-test timeout.
    /// Rejected while another test is in flight.
    pub async fn run_speed_test(&self) -> Result<SpeedTestMetrics, SamplerError> {
        let shared = &self.shared;
        if shared
            .speed_test_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SamplerError::SpeedTestInProgress);
        }
        let _running = SpeedTestGuard(shared);
        shared.update_speed_test(|s| s.is_running = true);
        tracing::info!("Speed test started");

        let limit = shared.config.speed_test_timeout;
        let (download_mbps, upload_mbps) = tokio::join!(
            bounded(limit, "speed_download", shared.probes.speed.download_mbps(), || 0.0),
            bounded(limit, "speed_upload", shared.probes.speed.upload_mbps(), || 0.0),
        );

        let result = SpeedTestMetrics {
            download_mbps,
            upload_mbps,
            is_running: false,
            last_test_time: Some(Utc::now()),
        };
        let published = result.clone();
        shared.update_speed_test(move |s| *s = published);
        tracing::info!(download_mbps, upload_mbps, "Speed test finished");
        Ok(result)
    }

    /// `None` when the platform cannot scan.
    pub async fn scan_interference(&self) -> Option<InterferenceScanResult> {
        let shared = &self.shared;
        let scan = bounded(
            shared.config.scan_timeout,
            "channel_scan",
            shared.probes.scanner.scan(),
            || None,
        )
        .await?;
        Some(interference::analyze(scan))
    }

    pub async fn check_captive_portal(&self) -> CaptivePortalStatus {
        let shared = &self.shared;
        bounded(
            shared.config.portal_timeout,
            "captive_portal",
            shared.probes.portal.check(),
            || CaptivePortalStatus::Unknown,
        )
        .await
    }
}

impl Drop for DiagnosticsSampler {
    fn drop(&mut self) {
        // The loop exits at its next poll; the task is detached.
        if let Some(t) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = t.shutdown_tx.send(());
        }
    }
}

/// Clears the in-flight flag when a speed test finishes or is cancelled.
struct SpeedTestGuard<'a>(&'a Shared);

impl Drop for SpeedTestGuard<'_> {
    fn drop(&mut self) {
        self.0.state_tx.send_if_modified(|current| {
            if !current.speed_test.is_running {
                return false;
            }
            let mut next = (**current).clone();
            next.speed_test.is_running = false;
            *current = Arc::new(next);
            true
        });
        self.0.speed_test_running.store(false, Ordering::Release);
    }
}

/// Awaits `fut` for at most `limit`; on timeout logs and returns `fallback()`.
async fn bounded<T>(
    limit: Duration,
    probe: &'static str,
    fut: impl Future<Output = T>,
    fallback: impl FnOnce() -> T,
) -> T {
    match tokio::time::timeout(limit, fut).await {
        Ok(v) => v,
        Err(_) => {
            tracing::debug!(probe, timeout_ms = limit.as_millis() as u64, "probe timed out");
            fallback()
        }
    }
}

impl Shared {
    fn read_histories(&self) -> std::sync::RwLockReadGuard<'_, MetricHistories> {
        self.histories.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_cycle(&self) -> Arc<NetworkState> {
        let mut link = self.link.lock().await;
        let sample = self.collect(&mut link).await;

        if sample.is_connected != link.was_connected {
            if sample.is_connected {
                tracing::info!(ssid = ?sample.wifi.ssid, channel = sample.wifi.channel, "Wi-Fi link up");
            } else {
                tracing::info!("Wi-Fi link down");
            }
        }
        link.gateway = sample.gateway_ip.clone();
        link.was_connected = sample.is_connected;

        self.ticks_total.fetch_add(1, Ordering::Relaxed);
        self.commit(sample)
    }

    async fn collect(&self, link: &mut LinkCache) -> TickSample {
        let wifi = self.read_wifi(&mut link.wifi_read).await;
        let is_connected = wifi.is_connected();
        let gateway_ip = self.gateway_for_tick(link, is_connected).await;

        let router = async {
            match gateway_ip.as_deref() {
                Some(ip) => self.ping(ip).await,
                None => PingMetrics::empty(GATEWAY_HOST_LABEL),
            }
        };
        let internet = self.ping(&self.config.internet_host);
        let dns = bounded(
            self.config.probe_timeout,
            "dns",
            self.probes.dns.lookup_time(&self.config.dns_test_host),
            DnsMetrics::empty,
        );
        let (router, internet, dns) = tokio::join!(router, internet, dns);

        let failures = [
            gateway_ip.is_some() && !router.is_reachable,
            !internet.is_reachable,
            !dns.is_working,
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count();
        if failures > 0 {
            self.probe_failures_total
                .fetch_add(failures as u64, Ordering::Relaxed);
        }

        TickSample {
            wifi,
            is_connected,
            gateway_ip,
            router,
            internet,
            dns,
        }
    }

    /// The adapter query is synchronous, so it runs on the blocking pool.
    /// A read that times out is kept in `pending`; later ticks report an empty
    /// link until it returns instead of stacking more blocked reads.
    async fn read_wifi(&self, pending: &mut Option<JoinHandle<WifiMetrics>>) -> WifiMetrics {
        if pending.as_ref().is_some_and(|read| !read.is_finished()) {
            tracing::debug!(operation = "read_wifi", "previous Wi-Fi read still outstanding");
            return WifiMetrics::empty();
        }
        let wifi = Arc::clone(&self.probes.wifi);
        let read = pending.insert(tokio::task::spawn_blocking(move || wifi.current_metrics()));
        let result = tokio::time::timeout(self.config.probe_timeout, read).await;
        match result {
            Ok(joined) => {
                *pending = None;
                joined.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, operation = "read_wifi", "Wi-Fi read failed");
                    WifiMetrics::empty()
                })
            }
            Err(_) => {
                tracing::warn!(operation = "read_wifi", "Wi-Fi read timed out");
                WifiMetrics::empty()
            }
        }
    }

    /// Reuses the cached gateway only across consecutive connected ticks.
    async fn gateway_for_tick(&self, link: &LinkCache, is_connected: bool) -> Option<String> {
        if is_connected && link.was_connected && link.gateway.is_some() {
            return link.gateway.clone();
        }
        let resolved = bounded(
            self.config.probe_timeout,
            "gateway",
            self.probes.gateway.default_gateway(),
            || None,
        )
        .await;
        if resolved.is_some() {
            tracing::debug!(gateway = ?resolved, "Gateway resolved");
        }
        if is_connected {
            resolved.or_else(|| link.gateway.clone())
        } else {
            resolved
        }
    }

    async fn ping(&self, host: &str) -> PingMetrics {
        bounded(
            self.config.probe_timeout,
            "ping",
            self.probes
                .pinger
                .ping(host, self.config.ping_count, self.config.ping_timeout),
            || PingMetrics::empty(host),
        )
        .await
    }

    /// Appends successful results to the histories, then swaps the snapshot.
    /// Nothing here awaits, so a cancelled tick never commits half a sample.
    fn commit(&self, sample: TickSample) -> Arc<NetworkState> {
        {
            let mut h = self
                .histories
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if sample.is_connected {
                h.rssi.append(f64::from(sample.wifi.rssi));
                h.noise.append(f64::from(sample.wifi.noise));
                h.link_rate.append(sample.wifi.link_rate);
            }
            if sample.router.is_reachable {
                h.router_latency.append(sample.router.latency);
                h.router_jitter.append(sample.router.jitter);
                h.router_loss.append(sample.router.packet_loss);
            }
            if sample.internet.is_reachable {
                h.internet_latency.append(sample.internet.latency);
                h.internet_jitter.append(sample.internet.jitter);
                h.internet_loss.append(sample.internet.packet_loss);
            }
            if sample.dns.is_working {
                h.dns_lookup.append(sample.dns.lookup_time);
            }
        }

        let mut next = NetworkState {
            wifi: sample.wifi,
            router: sample.router,
            internet: sample.internet,
            dns: sample.dns,
            speed_test: SpeedTestMetrics::default(),
            is_connected: sample.is_connected,
            gateway_ip: sample.gateway_ip,
        };
        self.state_tx.send_modify(|current| {
            next.speed_test = current.speed_test.clone();
            *current = Arc::new(next);
        });
        Arc::clone(&self.state_tx.borrow())
    }

    fn update_speed_test(&self, f: impl FnOnce(&mut SpeedTestMetrics)) {
        self.state_tx.send_modify(|current| {
            let mut next = (**current).clone();
            f(&mut next.speed_test);
            *current = Arc::new(next);
        });
    }
}

async fn run_loop(shared: Arc<Shared>, mut shutdown_rx: oneshot::Receiver<()>) {
    let sample_interval_ms = shared.config.sample_interval.as_millis() as u64;
    let loop_span = tracing::span!(tracing::Level::DEBUG, "sampler", sample_interval_ms);

    async move {
        let mut tick = interval(shared.config.sample_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(shared.config.stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sampler shutting down");
                    break;
                }
                _ = tick.tick() => {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown_rx => {
                            tracing::debug!("Sampler shutting down; abandoning in-flight probes");
                            break;
                        }
                        state = shared.run_cycle() => {
                            tracing::trace!(
                                connected = state.is_connected,
                                rssi = state.wifi.rssi,
                                internet_latency_ms = state.internet.latency,
                                "tick"
                            );
                        }
                    }
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ticks_total = shared.ticks_total.load(Ordering::Relaxed),
                        probe_failures_total = shared.probe_failures_total.load(Ordering::Relaxed),
                        state_subscribers = shared.state_tx.receiver_count(),
                        "sampler stats"
                    );
                }
            }
        }
    }
    .instrument(loop_span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_derives_timeouts_from_app_config() {
        let app = AppConfig::load_from_str(
            r#"
[server]
port = 8080
host = "127.0.0.1"

[probes]
probe_timeout_ms = 1500
"#,
        )
        .unwrap();
        let config = SamplerConfig::from_app_config(&app);
        assert_eq!(config.probe_timeout, Duration::from_millis(1500));
        assert_eq!(config.scan_timeout, Duration::from_millis(6000));
        assert_eq!(config.sample_interval, Duration::from_secs(1));
        assert_eq!(config.history_capacity, 60);
    }
}
