// Throughput test result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestMetrics {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub is_running: bool,
    pub last_test_time: Option<DateTime<Utc>>,
}
