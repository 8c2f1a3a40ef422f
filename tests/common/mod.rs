// Shared test helpers: scripted probes and snapshot builders
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use wifidiag::models::*;
use wifidiag::probes::*;
use wifidiag::sampler::SamplerConfig;

pub const ROUTER_IP: &str = "192.168.1.1";
pub const INTERNET_HOST: &str = "1.1.1.1";

pub fn connected_wifi(rssi: i32) -> WifiMetrics {
    WifiMetrics::connected("HomeNet", Some("aa:bb:cc:dd:ee:01".into()), rssi, -90, 36, 866.0)
}

pub fn reachable(host: &str, latency: f64) -> PingMetrics {
    PingMetrics {
        host: host.into(),
        latency,
        jitter: 1.0,
        packet_loss: 0.0,
        is_reachable: true,
    }
}

pub fn working_dns(lookup_time: f64) -> DnsMetrics {
    DnsMetrics {
        server: "192.168.1.1".into(),
        lookup_time,
        is_working: true,
    }
}

/// Connected snapshot on 5 GHz with healthy router and internet results.
pub fn healthy_state(rssi: i32) -> NetworkState {
    NetworkState {
        wifi: connected_wifi(rssi),
        router: reachable(ROUTER_IP, 2.0),
        internet: reachable(INTERNET_HOST, 15.0),
        dns: working_dns(20.0),
        speed_test: SpeedTestMetrics::default(),
        is_connected: true,
        gateway_ip: Some(ROUTER_IP.into()),
    }
}

/// Short cadence and timeouts so loop tests finish quickly.
pub fn fast_config() -> SamplerConfig {
    SamplerConfig {
        sample_interval: Duration::from_millis(20),
        stats_log_interval: Duration::from_secs(60),
        history_capacity: 60,
        internet_host: INTERNET_HOST.into(),
        dns_test_host: "apple.com".into(),
        ping_count: 1,
        ping_timeout: Duration::from_millis(100),
        probe_timeout: Duration::from_millis(200),
        speed_test_timeout: Duration::from_millis(500),
        scan_timeout: Duration::from_millis(500),
        portal_timeout: Duration::from_millis(500),
    }
}

pub struct FakeWifi {
    metrics: Mutex<WifiMetrics>,
}

impl FakeWifi {
    pub fn new(metrics: WifiMetrics) -> Self {
        Self {
            metrics: Mutex::new(metrics),
        }
    }

    pub fn set(&self, metrics: WifiMetrics) {
        *self.metrics.lock().unwrap() = metrics;
    }
}

impl WifiLink for FakeWifi {
    fn current_metrics(&self) -> WifiMetrics {
        self.metrics.lock().unwrap().clone()
    }
}

/// Adapter whose read blocks its thread for `hang`, like a wedged `iw`.
/// Tracks how many reads are blocked at once.
pub struct HangingWifi {
    hang: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl HangingWifi {
    pub fn new(hang: Duration) -> Self {
        Self {
            hang,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl WifiLink for HangingWifi {
    fn current_metrics(&self) -> WifiMetrics {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.hang);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        connected_wifi(-50)
    }
}

/// Answers from a script, then repeats `fallback`. Counts calls.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Option<String>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Option<&str>>, fallback: Option<&str>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(|s| s.map(str::to_string)).collect()),
            fallback: fallback.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayResolver for ScriptedGateway {
    async fn default_gateway(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Per-host canned results; unknown hosts are unreachable.
pub struct FakePinger {
    results: Mutex<HashMap<String, PingMetrics>>,
    delay: Duration,
    hosts_pinged: Mutex<Vec<String>>,
}

impl FakePinger {
    pub fn new(results: Vec<PingMetrics>) -> Self {
        Self::with_delay(results, Duration::ZERO)
    }

    pub fn with_delay(results: Vec<PingMetrics>, delay: Duration) -> Self {
        Self {
            results: Mutex::new(results.into_iter().map(|r| (r.host.clone(), r)).collect()),
            delay,
            hosts_pinged: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, result: PingMetrics) {
        self.results
            .lock()
            .unwrap()
            .insert(result.host.clone(), result);
    }

    pub fn hosts_pinged(&self) -> Vec<String> {
        self.hosts_pinged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pinger for FakePinger {
    async fn ping(&self, host: &str, _count: u32, _timeout: Duration) -> PingMetrics {
        self.hosts_pinged.lock().unwrap().push(host.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = self.results.lock().unwrap().get(host).cloned();
        result.unwrap_or_else(|| PingMetrics::empty(host))
    }
}

/// Holds every ping until `release` is called. Counts pings waiting at the gate.
pub struct GatedPinger {
    waiting: AtomicUsize,
    gate: Semaphore,
}

impl GatedPinger {
    pub fn new() -> Self {
        Self {
            waiting: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }

    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.gate.add_permits(64);
    }
}

#[async_trait]
impl Pinger for GatedPinger {
    async fn ping(&self, host: &str, _count: u32, _timeout: Duration) -> PingMetrics {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let _permit = self.gate.acquire().await;
        reachable(host, 5.0)
    }
}

pub struct FakeDns(pub DnsMetrics);

#[async_trait]
impl DnsProbe for FakeDns {
    async fn lookup_time(&self, _hostname: &str) -> DnsMetrics {
        self.0.clone()
    }
}

pub struct FakeSpeed {
    pub download: f64,
    pub upload: f64,
    pub delay: Duration,
}

#[async_trait]
impl SpeedProbe for FakeSpeed {
    async fn download_mbps(&self) -> f64 {
        tokio::time::sleep(self.delay).await;
        self.download
    }

    async fn upload_mbps(&self) -> f64 {
        tokio::time::sleep(self.delay).await;
        self.upload
    }
}

pub struct FakeScanner(pub Option<ChannelScan>);

#[async_trait]
impl ChannelScanner for FakeScanner {
    async fn scan(&self) -> Option<ChannelScan> {
        self.0.clone()
    }
}

pub struct FakePortal(pub CaptivePortalStatus);

#[async_trait]
impl CaptivePortalProbe for FakePortal {
    async fn check(&self) -> CaptivePortalStatus {
        self.0.clone()
    }
}

/// Handles to every fake, so tests can rescript them between ticks.
pub struct FakeNetwork {
    pub wifi: Arc<FakeWifi>,
    pub gateway: Arc<ScriptedGateway>,
    pub pinger: Arc<FakePinger>,
    pub dns: Arc<FakeDns>,
    pub speed: Arc<FakeSpeed>,
    pub scanner: Arc<FakeScanner>,
    pub portal: Arc<FakePortal>,
}

impl FakeNetwork {
    /// Strong 5 GHz link, router and internet reachable, DNS working.
    pub fn healthy() -> Self {
        Self {
            wifi: Arc::new(FakeWifi::new(connected_wifi(-50))),
            gateway: Arc::new(ScriptedGateway::new(vec![], Some(ROUTER_IP))),
            pinger: Arc::new(FakePinger::new(vec![
                reachable(ROUTER_IP, 2.0),
                reachable(INTERNET_HOST, 15.0),
            ])),
            dns: Arc::new(FakeDns(working_dns(20.0))),
            speed: Arc::new(FakeSpeed {
                download: 250.0,
                upload: 40.0,
                delay: Duration::from_millis(10),
            }),
            scanner: Arc::new(FakeScanner(None)),
            portal: Arc::new(FakePortal(CaptivePortalStatus::NoPortal)),
        }
    }

    pub fn probes(&self) -> Probes {
        Probes {
            wifi: self.wifi.clone(),
            gateway: self.gateway.clone(),
            pinger: self.pinger.clone(),
            dns: self.dns.clone(),
            speed: self.speed.clone(),
            scanner: self.scanner.clone(),
            portal: self.portal.clone(),
        }
    }
}
