// Neighbouring network scan via NetworkManager's terse `nmcli` output.

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use super::{ChannelScanner, ProbeError, run_command};
use crate::models::{ChannelScan, FrequencyBand, NearbyNetwork};

const NMCLI_FIELDS: &str = "IN-USE,SSID,BSSID,CHAN,FREQ,SIGNAL";

pub struct SystemChannelScanner {
    timeout: Duration,
}

impl SystemChannelScanner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self) -> Result<ChannelScan, ProbeError> {
        let output = run_command(
            "nmcli",
            &["-t", "-f", NMCLI_FIELDS, "dev", "wifi", "list", "--rescan", "auto"],
            self.timeout,
        )
        .await?;
        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                command: "nmcli".into(),
                status: output.status,
            });
        }
        Ok(parse_nmcli_scan(&output.stdout))
    }
}

#[async_trait]
impl ChannelScanner for SystemChannelScanner {
    #[instrument(skip(self), fields(probe = "channel_scan"))]
    async fn scan(&self) -> Option<ChannelScan> {
        match self.run().await {
            Ok(scan) => Some(scan),
            Err(e) => {
                tracing::warn!(error = %e, "channel scan unavailable");
                None
            }
        }
    }
}

/// nmcli reports signal as 0-100 %; map it linearly onto -100..-50 dBm.
pub(crate) fn signal_percent_to_dbm(percent: i32) -> i32 {
    percent.clamp(0, 100) / 2 - 100
}

/// Splits one terse line on unescaped `:`; `\:` and `\\` are unescaped.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Hidden (empty SSID) networks are skipped. The in-use row sets the current
/// channel and band; without one both are unknown.
pub(crate) fn parse_nmcli_scan(output: &str) -> ChannelScan {
    let mut current_channel = 0;
    let mut current_band = FrequencyBand::Unknown;
    let mut networks = Vec::new();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let fields = split_terse(line);
        let [in_use, ssid, bssid, chan, freq, signal] = fields.as_slice() else {
            continue;
        };
        let Ok(channel) = chan.trim().parse::<i32>() else {
            continue;
        };
        let band = freq
            .split_whitespace()
            .next()
            .and_then(|f| f.parse::<u32>().ok())
            .map(FrequencyBand::from_frequency_mhz)
            .unwrap_or_else(|| FrequencyBand::from_channel(channel));

        if in_use.trim() == "*" {
            current_channel = channel;
            current_band = band;
        }
        if ssid.is_empty() {
            continue;
        }
        let rssi = signal_percent_to_dbm(signal.trim().parse().unwrap_or(0));
        networks.push(NearbyNetwork {
            ssid: ssid.clone(),
            bssid: bssid.clone(),
            channel,
            rssi,
            band,
        });
    }

    ChannelScan {
        current_channel,
        current_band,
        networks,
    }
}
