// Captive portal detection result

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CaptivePortalStatus {
    NoPortal,
    Detected {
        #[serde(rename = "loginUrl")]
        login_url: Option<String>,
    },
    Unknown,
}

impl CaptivePortalStatus {
    pub fn is_detected(&self) -> bool {
        matches!(self, CaptivePortalStatus::Detected { .. })
    }
}
