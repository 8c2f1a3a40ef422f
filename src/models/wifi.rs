// Wi-Fi link models

use serde::{Deserialize, Serialize};

/// Radio band, derived from the channel number (or the centre frequency when known).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyBand {
    #[serde(rename = "2.4GHz")]
    TwoPointFourGhz,
    #[serde(rename = "5GHz")]
    FiveGhz,
    #[serde(rename = "6GHz")]
    SixGhz,
    #[serde(rename = "unknown")]
    Unknown,
}

impl FrequencyBand {
    /// 1-14 is 2.4 GHz, 36-177 is 5 GHz, anything else up to 233 is treated as 6 GHz.
    pub fn from_channel(channel: i32) -> Self {
        match channel {
            1..=14 => FrequencyBand::TwoPointFourGhz,
            36..=177 => FrequencyBand::FiveGhz,
            1..=233 => FrequencyBand::SixGhz,
            _ => FrequencyBand::Unknown,
        }
    }

    pub fn from_frequency_mhz(freq: u32) -> Self {
        match freq {
            2400..=2500 => FrequencyBand::TwoPointFourGhz,
            5000..=5900 => FrequencyBand::FiveGhz,
            5925..=7125 => FrequencyBand::SixGhz,
            _ => FrequencyBand::Unknown,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FrequencyBand::TwoPointFourGhz => "2.4 GHz",
            FrequencyBand::FiveGhz => "5 GHz",
            FrequencyBand::SixGhz => "6 GHz",
            FrequencyBand::Unknown => "Unknown",
        }
    }
}

/// Map a centre frequency (MHz) to its 802.11 channel number. 0 when unknown.
pub fn channel_from_frequency_mhz(freq: u32) -> i32 {
    match freq {
        2484 => 14,
        2412..=2472 => ((freq - 2407) / 5) as i32,
        5000..=5900 => ((freq - 5000) / 5) as i32,
        5955..=7115 => ((freq - 5950) / 5) as i32,
        _ => 0,
    }
}

/// Current radio-link metrics. Replaced wholesale on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiMetrics {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    /// Signal strength (RSSI), dBm.
    pub rssi: i32,
    /// Noise floor, dBm.
    pub noise: i32,
    pub channel: i32,
    /// Transmit link rate, Mbps.
    pub link_rate: f64,
    pub band: FrequencyBand,
}

impl WifiMetrics {
    /// Value reported when no adapter is present or the link is down.
    pub fn empty() -> Self {
        Self {
            ssid: None,
            bssid: None,
            rssi: -100,
            noise: -100,
            channel: 0,
            link_rate: 0.0,
            band: FrequencyBand::Unknown,
        }
    }

    /// Connected link; the band is derived from `channel`.
    pub fn connected(
        ssid: impl Into<String>,
        bssid: Option<String>,
        rssi: i32,
        noise: i32,
        channel: i32,
        link_rate: f64,
    ) -> Self {
        Self {
            ssid: Some(ssid.into()),
            bssid,
            rssi,
            noise,
            channel,
            link_rate,
            band: FrequencyBand::from_channel(channel),
        }
    }

    /// Signal-to-noise ratio, dB.
    pub fn snr(&self) -> i32 {
        self.rssi - self.noise
    }

    pub fn is_connected(&self) -> bool {
        self.ssid.is_some()
    }
}

impl Default for WifiMetrics {
    fn default() -> Self {
        Self::empty()
    }
}
