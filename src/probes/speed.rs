// Throughput probe: timed HTTP download and upload against a speed-test endpoint.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::instrument;

use super::{ProbeError, SpeedProbe};
use crate::config::SpeedTestConfig;
use crate::version::user_agent;

pub struct HttpSpeedProbe {
    client: reqwest::Client,
    download_url: String,
    upload_url: String,
    upload_bytes: usize,
}

impl HttpSpeedProbe {
    pub fn new(config: &SpeedTestConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            download_url: config.download_url.clone(),
            upload_url: config.upload_url.clone(),
            upload_bytes: config.upload_bytes,
        })
    }

    async fn download(&self) -> Result<f64, ProbeError> {
        let started = Instant::now();
        let mut resp = self
            .client
            .get(&self.download_url)
            .send()
            .await?
            .error_for_status()?;
        let mut received: u64 = 0;
        while let Some(chunk) = resp.chunk().await? {
            received += chunk.len() as u64;
        }
        Ok(mbps(received, started.elapsed()))
    }

    async fn upload(&self) -> Result<f64, ProbeError> {
        let body = vec![0u8; self.upload_bytes];
        let started = Instant::now();
        self.client
            .post(&self.upload_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(mbps(self.upload_bytes as u64, started.elapsed()))
    }
}

#[async_trait]
impl SpeedProbe for HttpSpeedProbe {
    #[instrument(skip(self), fields(probe = "speed_download"))]
    async fn download_mbps(&self) -> f64 {
        self.download().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "download test failed");
            0.0
        })
    }

    #[instrument(skip(self), fields(probe = "speed_upload"))]
    async fn upload_mbps(&self) -> f64 {
        self.upload().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "upload test failed");
            0.0
        })
    }
}

/// Megabits per second for `bytes` moved in `elapsed`. 0 for a zero duration.
pub(crate) fn mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / secs / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_megabytes_in_one_second_is_eighty_mbps() {
        assert!((mbps(10_000_000, Duration::from_secs(1)) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_is_zero() {
        assert_eq!(mbps(1_000_000, Duration::ZERO), 0.0);
    }
}
