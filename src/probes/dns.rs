// DNS responsiveness: time one resolution through the system resolver.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::instrument;

use super::DnsProbe;
use crate::models::DnsMetrics;

const RESOLV_CONF: &str = "/etc/resolv.conf";

pub struct SystemDnsProbe {
    resolv_conf: PathBuf,
    timeout: Duration,
}

impl SystemDnsProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            resolv_conf: PathBuf::from(RESOLV_CONF),
            timeout,
        }
    }

    async fn configured_server(&self) -> Option<String> {
        let content = tokio::fs::read_to_string(&self.resolv_conf).await.ok()?;
        parse_nameserver(&content)
    }
}

#[async_trait]
impl DnsProbe for SystemDnsProbe {
    #[instrument(skip(self), fields(probe = "dns"))]
    async fn lookup_time(&self, hostname: &str) -> DnsMetrics {
        let server = self
            .configured_server()
            .await
            .unwrap_or_else(|| DnsMetrics::UNKNOWN_SERVER.to_string());

        let started = Instant::now();
        let resolved = tokio::time::timeout(self.timeout, tokio::net::lookup_host((hostname, 0)))
            .await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let is_working = match resolved {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, hostname, "dns lookup failed");
                false
            }
            Err(_) => {
                tracing::debug!(hostname, timeout_ms = self.timeout.as_millis() as u64, "dns lookup timed out");
                false
            }
        };

        DnsMetrics {
            server,
            lookup_time: if is_working { elapsed_ms } else { 0.0 },
            is_working,
        }
    }
}

/// First `nameserver` entry of a resolv.conf.
pub(crate) fn parse_nameserver(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('#') && !l.starts_with(';'))
        .find_map(|l| {
            let mut parts = l.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("nameserver"), Some(addr)) => Some(addr.to_string()),
                _ => None,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_nameserver() {
        let conf = "# generated\nsearch lan\nnameserver 192.168.1.1\nnameserver 1.1.1.1\n";
        assert_eq!(parse_nameserver(conf).as_deref(), Some("192.168.1.1"));
    }

    #[test]
    fn ignores_commented_entries() {
        let conf = "; nameserver 9.9.9.9\n#nameserver 8.8.8.8\noptions edns0\n";
        assert_eq!(parse_nameserver(conf), None);
    }
}
