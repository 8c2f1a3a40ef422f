// Channel scan and interference models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FrequencyBand;

/// One network seen during a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyNetwork {
    pub ssid: String,
    pub bssid: String,
    pub channel: i32,
    pub rssi: i32,
    pub band: FrequencyBand,
}

impl NearbyNetwork {
    /// Band derived from `channel`.
    pub fn new(ssid: impl Into<String>, bssid: impl Into<String>, channel: i32, rssi: i32) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: bssid.into(),
            channel,
            rssi,
            band: FrequencyBand::from_channel(channel),
        }
    }

    pub fn signal_description(&self) -> &'static str {
        match self.rssi {
            r if r >= -50 => "Strong",
            -60..=-51 => "Good",
            -70..=-61 => "Fair",
            -80..=-71 => "Weak",
            _ => "Very Weak",
        }
    }
}

/// Raw output of a channel scan: where the device is and what it can see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelScan {
    pub current_channel: i32,
    pub current_band: FrequencyBand,
    pub networks: Vec<NearbyNetwork>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CongestionLevel {
    Empty,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl CongestionLevel {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => CongestionLevel::Empty,
            1 => CongestionLevel::Low,
            2..=3 => CongestionLevel::Moderate,
            4..=6 => CongestionLevel::High,
            _ => CongestionLevel::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CongestionLevel::Empty => "Empty",
            CongestionLevel::Low => "Low",
            CongestionLevel::Moderate => "Moderate",
            CongestionLevel::High => "High",
            CongestionLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCongestion {
    pub channel: i32,
    pub band: FrequencyBand,
    pub network_count: usize,
    pub is_current_channel: bool,
    pub level: CongestionLevel,
}

impl ChannelCongestion {
    pub fn new(channel: i32, band: FrequencyBand, network_count: usize, is_current_channel: bool) -> Self {
        Self {
            channel,
            band,
            network_count,
            is_current_channel,
            level: CongestionLevel::from_count(network_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterferenceRecommendation {
    pub title: String,
    pub message: String,
    /// True when the advice is a concrete user action (switching band).
    pub actionable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterferenceScanResult {
    pub current_channel: i32,
    pub current_band: FrequencyBand,
    /// Strongest first.
    pub nearby_networks: Vec<NearbyNetwork>,
    pub channel_congestion: Vec<ChannelCongestion>,
    pub recommendation: Option<InterferenceRecommendation>,
    pub scan_time: DateTime<Utc>,
}

impl InterferenceScanResult {
    pub fn networks_on_same_channel(&self) -> impl Iterator<Item = &NearbyNetwork> {
        self.nearby_networks
            .iter()
            .filter(|n| n.channel == self.current_channel && n.band == self.current_band)
    }

    pub fn two_ghz_network_count(&self) -> usize {
        count_in_band(&self.nearby_networks, FrequencyBand::TwoPointFourGhz)
    }

    pub fn five_ghz_network_count(&self) -> usize {
        count_in_band(&self.nearby_networks, FrequencyBand::FiveGhz)
    }

    pub fn congestion_for(&self, channel: i32, band: FrequencyBand) -> Option<&ChannelCongestion> {
        self.channel_congestion
            .iter()
            .find(|c| c.channel == channel && c.band == band)
    }
}

pub(crate) fn count_in_band(networks: &[NearbyNetwork], band: FrequencyBand) -> usize {
    networks.iter().filter(|n| n.band == band).count()
}
