// Ping and DNS probe results

use serde::{Deserialize, Serialize};

/// Result of an echo probe against one host.
/// `packet_loss == 100` and `is_reachable == false` always go together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingMetrics {
    pub host: String,
    /// Average round-trip time, ms.
    pub latency: f64,
    /// Spread of round-trip times, ms.
    pub jitter: f64,
    /// 0-100.
    pub packet_loss: f64,
    pub is_reachable: bool,
}

impl PingMetrics {
    /// Unreachable result for `host`.
    pub fn empty(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            latency: 0.0,
            jitter: 0.0,
            packet_loss: 100.0,
            is_reachable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsMetrics {
    pub server: String,
    /// Resolution time, ms. 0 when the lookup failed.
    pub lookup_time: f64,
    pub is_working: bool,
}

impl DnsMetrics {
    pub const UNKNOWN_SERVER: &'static str = "Unknown";

    pub fn empty() -> Self {
        Self {
            server: Self::UNKNOWN_SERVER.into(),
            lookup_time: 0.0,
            is_working: false,
        }
    }
}

impl Default for DnsMetrics {
    fn default() -> Self {
        Self::empty()
    }
}
