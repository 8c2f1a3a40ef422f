// Radio-link metrics on Linux: `iw dev <if> link` plus the noise column of
// /proc/net/wireless. The wireless interface is found via sysinfo.

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use sysinfo::Networks;

use super::{ProbeError, WifiLink};
use crate::models::{FrequencyBand, WifiMetrics, channel_from_frequency_mhz};

const SYS_CLASS_NET: &str = "/sys/class/net";
const PROC_NET_WIRELESS: &str = "/proc/net/wireless";
const EXIT_POLL: Duration = Duration::from_millis(10);

pub struct SystemWifiLink {
    interface: Option<String>,
    deadline: Duration,
}

impl SystemWifiLink {
    /// `interface` pins the adapter; `None` picks the first wireless interface.
    /// `iw` is killed if it runs longer than `deadline`.
    pub fn new(interface: Option<String>, deadline: Duration) -> Self {
        Self {
            interface,
            deadline,
        }
    }

    fn interface_name(&self) -> Option<String> {
        self.interface.clone().or_else(detect_wireless_interface)
    }

    fn read(&self) -> Result<WifiMetrics, ProbeError> {
        let iface = self.interface_name().ok_or(ProbeError::NoInterface)?;
        let mut iw = Command::new("iw");
        iw.args(["dev", &iface, "link"]);
        let output = output_with_deadline(&mut iw, "iw", self.deadline)?;
        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                command: "iw".into(),
                status: output.status,
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(link) = parse_iw_link(&stdout) else {
            // "Not connected."
            return Ok(WifiMetrics::empty());
        };

        let noise = std::fs::read_to_string(PROC_NET_WIRELESS)
            .ok()
            .and_then(|c| parse_proc_wireless_noise(&c, &iface))
            .unwrap_or(-100);

        let channel = link.freq_mhz.map(channel_from_frequency_mhz).unwrap_or(0);
        let band = link
            .freq_mhz
            .map(FrequencyBand::from_frequency_mhz)
            .unwrap_or_else(|| FrequencyBand::from_channel(channel));

        Ok(WifiMetrics {
            ssid: Some(link.ssid),
            bssid: link.bssid,
            rssi: link.signal_dbm.unwrap_or(-100),
            noise,
            channel,
            link_rate: link.tx_bitrate_mbps.unwrap_or(0.0),
            band,
        })
    }
}

impl WifiLink for SystemWifiLink {
    fn current_metrics(&self) -> WifiMetrics {
        self.read().unwrap_or_else(|e| {
            tracing::debug!(error = %e, probe = "wifi", "wifi link unavailable");
            WifiMetrics::empty()
        })
    }
}

/// Blocking counterpart of `run_command`: waits for the child until `deadline`,
/// then kills and reaps it.
pub(crate) fn output_with_deadline(
    command: &mut Command,
    program: &str,
    deadline: Duration,
) -> Result<Output, ProbeError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ProbeError::Spawn {
            command: program.to_string(),
            source,
        })?;
    let started = Instant::now();
    while child.try_wait()?.is_none() {
        if started.elapsed() >= deadline {
            // kill fails only if the child already exited
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProbeError::Timeout(program.to_string()));
        }
        std::thread::sleep(EXIT_POLL);
    }
    Ok(child.wait_with_output()?)
}

/// First interface (by name) that exposes a `wireless` directory in sysfs.
fn detect_wireless_interface() -> Option<String> {
    let networks = Networks::new_with_refreshed_list();
    let mut names: Vec<&String> = networks
        .list()
        .keys()
        .filter(|name| Path::new(SYS_CLASS_NET).join(name).join("wireless").exists())
        .collect();
    names.sort();
    names.first().map(|n| n.to_string())
}

#[derive(Debug, PartialEq)]
pub(crate) struct IwLink {
    pub ssid: String,
    pub bssid: Option<String>,
    pub freq_mhz: Option<u32>,
    pub signal_dbm: Option<i32>,
    pub tx_bitrate_mbps: Option<f64>,
}

/// `None` when not associated or the SSID is missing.
pub(crate) fn parse_iw_link(output: &str) -> Option<IwLink> {
    let mut ssid = None;
    let mut bssid = None;
    let mut freq_mhz = None;
    let mut signal_dbm = None;
    let mut tx_bitrate_mbps = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Connected to ") {
            bssid = rest.split_whitespace().next().map(str::to_string);
        } else if let Some(rest) = line.strip_prefix("SSID:") {
            ssid = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("freq:") {
            // newer iw prints "freq: 5180.0"
            freq_mhz = rest
                .split_whitespace()
                .next()
                .and_then(|f| f.parse::<f64>().ok())
                .map(|f| f as u32);
        } else if let Some(rest) = line.strip_prefix("signal:") {
            signal_dbm = rest.split_whitespace().next().and_then(|s| s.parse().ok());
        } else if let Some(rest) = line.strip_prefix("tx bitrate:") {
            tx_bitrate_mbps = rest.split_whitespace().next().and_then(|s| s.parse().ok());
        }
    }

    let ssid = ssid.filter(|s| !s.is_empty())?;
    Some(IwLink {
        ssid,
        bssid,
        freq_mhz,
        signal_dbm,
        tx_bitrate_mbps,
    })
}

/// Noise level (dBm) for `iface`. Drivers that do not report it print -256.
pub(crate) fn parse_proc_wireless_noise(content: &str, iface: &str) -> Option<i32> {
    content.lines().skip(2).find_map(|line| {
        let (name, rest) = line.trim().split_once(':')?;
        if name != iface {
            return None;
        }
        // status, link, level, noise
        let noise: f64 = rest
            .split_whitespace()
            .nth(3)?
            .trim_end_matches('.')
            .parse()
            .ok()?;
        let noise = noise as i32;
        (-255..0).contains(&noise).then_some(noise)
    })
}
