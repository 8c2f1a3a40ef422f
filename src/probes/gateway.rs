// Default gateway lookup: kernel routing table on Linux, `route` elsewhere.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

use super::{GatewayResolver, ProbeError, run_command};

const PROC_NET_ROUTE: &str = "/proc/net/route";
const ROUTE_TIMEOUT: Duration = Duration::from_secs(2);
/// RTF_GATEWAY
const ROUTE_FLAG_GATEWAY: u32 = 0x2;

pub struct SystemGatewayResolver {
    route_table: PathBuf,
}

impl Default for SystemGatewayResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemGatewayResolver {
    pub fn new() -> Self {
        Self {
            route_table: PathBuf::from(PROC_NET_ROUTE),
        }
    }

    async fn resolve(&self) -> Result<Option<String>, ProbeError> {
        if let Ok(content) = tokio::fs::read_to_string(&self.route_table).await {
            return Ok(parse_proc_net_route(&content).map(|ip| ip.to_string()));
        }
        let output = run_command("route", &["-n", "get", "default"], ROUTE_TIMEOUT).await?;
        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                command: "route".into(),
                status: output.status,
            });
        }
        Ok(parse_route_get(&output.stdout))
    }
}

#[async_trait]
impl GatewayResolver for SystemGatewayResolver {
    #[instrument(skip(self), fields(probe = "gateway"))]
    async fn default_gateway(&self) -> Option<String> {
        match self.resolve().await {
            Ok(gw) => gw,
            Err(e) => {
                tracing::debug!(error = %e, "gateway resolution failed");
                None
            }
        }
    }
}

/// Gateway of the first default route with the gateway flag set.
/// Addresses in the table are little-endian hex.
pub(crate) fn parse_proc_net_route(content: &str) -> Option<Ipv4Addr> {
    content.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[1] != "00000000" {
            return None;
        }
        let flags = u32::from_str_radix(fields[3], 16).ok()?;
        if flags & ROUTE_FLAG_GATEWAY == 0 {
            return None;
        }
        let raw = u32::from_str_radix(fields[2], 16).ok()?;
        if raw == 0 {
            return None;
        }
        Some(Ipv4Addr::from(raw.to_le_bytes()))
    })
}

/// `gateway:` line of BSD `route -n get default`.
pub(crate) fn parse_route_get(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        (key.trim() == "gateway")
            .then(|| value.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_TABLE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
wlan0\t0000A8C0\t00000000\t0001\t0\t0\t600\t00FFFFFF\t0\t0\t0
wlan0\t00000000\t0101A8C0\t0003\t0\t0\t600\t00000000\t0\t0\t0
";

    #[test]
    fn finds_default_route_gateway() {
        assert_eq!(
            parse_proc_net_route(ROUTE_TABLE),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn no_default_route_yields_none() {
        let table = "Iface\tDestination\tGateway\tFlags\nwlan0\t0000A8C0\t00000000\t0001\n";
        assert_eq!(parse_proc_net_route(table), None);
    }

    #[test]
    fn parses_bsd_route_output() {
        let out = "   route to: default\ndestination: default\n    gateway: 10.0.0.1\n  interface: en0\n";
        assert_eq!(parse_route_get(out).as_deref(), Some("10.0.0.1"));
    }
}
