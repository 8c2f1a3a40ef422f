// Domain models: link metrics, probe results, snapshot, scan and tip types

mod portal;
mod probe;
mod scan;
mod speed;
mod state;
mod tip;
mod wifi;

pub use portal::CaptivePortalStatus;
pub use probe::{DnsMetrics, PingMetrics};
pub use scan::{
    ChannelCongestion, ChannelScan, CongestionLevel, InterferenceRecommendation,
    InterferenceScanResult, NearbyNetwork,
};
pub(crate) use scan::count_in_band;
pub use speed::SpeedTestMetrics;
pub use state::{GATEWAY_HOST_LABEL, NetworkState};
pub use tip::{Severity, Tip};
pub use wifi::{FrequencyBand, WifiMetrics, channel_from_frequency_mhz};
