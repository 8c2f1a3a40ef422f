// Captive portal detection: fetch a known-good page without following redirects.

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use super::{CaptivePortalProbe, ProbeError};
use crate::config::CaptivePortalConfig;
use crate::models::CaptivePortalStatus;
use crate::version::user_agent;

pub struct HttpCaptivePortalProbe {
    client: reqwest::Client,
    url: String,
    expected_body: String,
}

impl HttpCaptivePortalProbe {
    pub fn new(config: &CaptivePortalConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            expected_body: config.expected_body.clone(),
        })
    }

    async fn fetch(&self) -> Result<CaptivePortalStatus, ProbeError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.unwrap_or_default();
        Ok(classify_response(status, location, &body, &self.expected_body))
    }
}

#[async_trait]
impl CaptivePortalProbe for HttpCaptivePortalProbe {
    #[instrument(skip(self), fields(probe = "captive_portal"))]
    async fn check(&self) -> CaptivePortalStatus {
        match self.fetch().await {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = %e, "captive portal check failed");
                CaptivePortalStatus::Unknown
            }
        }
    }
}

/// Any answer other than the expected page means something is intercepting traffic.
pub(crate) fn classify_response(
    status: u16,
    location: Option<String>,
    body: &str,
    expected_body: &str,
) -> CaptivePortalStatus {
    if status == 200 && body.contains(expected_body) {
        return CaptivePortalStatus::NoPortal;
    }
    let login_url = match status {
        301 | 302 | 303 | 307 | 308 => location.filter(|l| !l.is_empty()),
        _ => None,
    };
    CaptivePortalStatus::Detected { login_url }
}
