// Aggregate network snapshot

use serde::{Deserialize, Serialize};

use super::{DnsMetrics, PingMetrics, SpeedTestMetrics, WifiMetrics};

/// Host label used for the router result when no gateway address is known.
pub const GATEWAY_HOST_LABEL: &str = "Gateway";

/// One complete view of the connection. A new value is produced per tick and
/// swapped in whole; readers never see a half-merged state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    pub wifi: WifiMetrics,
    pub router: PingMetrics,
    pub internet: PingMetrics,
    pub dns: DnsMetrics,
    pub speed_test: SpeedTestMetrics,
    pub is_connected: bool,
    /// Last known default gateway; kept across ticks while connected.
    pub gateway_ip: Option<String>,
}

impl NetworkState {
    pub fn empty(internet_host: &str) -> Self {
        Self {
            wifi: WifiMetrics::empty(),
            router: PingMetrics::empty(GATEWAY_HOST_LABEL),
            internet: PingMetrics::empty(internet_host),
            dns: DnsMetrics::empty(),
            speed_test: SpeedTestMetrics::default(),
            is_connected: false,
            gateway_ip: None,
        }
    }
}
