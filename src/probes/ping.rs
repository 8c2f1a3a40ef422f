// Echo probe via the system `ping` utility.

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use super::{Pinger, ProbeError, run_command};
use crate::models::PingMetrics;

/// Extra time on top of `count * timeout` before the whole run is abandoned.
const DEADLINE_SLACK: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct SystemPinger;

impl SystemPinger {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, host: &str, count: u32, timeout: Duration) -> Result<PingMetrics, ProbeError> {
        let count_arg = count.max(1).to_string();
        // Linux takes -W in seconds, BSD/macOS in milliseconds.
        let wait_arg = if cfg!(target_os = "macos") {
            timeout.as_millis().max(1).to_string()
        } else {
            timeout.as_secs().max(1).to_string()
        };
        let deadline = timeout * count.max(1) + DEADLINE_SLACK;
        let output = run_command(
            "ping",
            &["-n", "-c", &count_arg, "-W", &wait_arg, host],
            deadline,
        )
        .await?;
        // ping exits non-zero on partial loss; the summary is still valid.
        parse_ping_output(&output.stdout, host).ok_or_else(|| ProbeError::Parse("ping".into()))
    }
}

#[async_trait]
impl Pinger for SystemPinger {
    #[instrument(skip(self), fields(probe = "ping"))]
    async fn ping(&self, host: &str, count: u32, timeout: Duration) -> PingMetrics {
        match self.run(host, count, timeout).await {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, host, "ping failed");
                PingMetrics::empty(host)
            }
        }
    }
}

/// Parses the summary lines of Linux (iputils), BusyBox and BSD ping output.
/// Returns `None` when no packet-loss line is present.
pub(crate) fn parse_ping_output(output: &str, host: &str) -> Option<PingMetrics> {
    let mut packet_loss = None;
    let mut latency = 0.0;
    let mut jitter = 0.0;

    for line in output.lines() {
        if let Some(idx) = line.find("% packet loss") {
            packet_loss = line[..idx]
                .rsplit([' ', ','])
                .next()
                .and_then(|s| s.parse::<f64>().ok());
        }

        if (line.contains("round-trip") || line.contains("rtt"))
            && let Some((_, stats)) = line.split_once(" = ")
        {
            let fields: Vec<f64> = stats
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .split('/')
                .filter_map(|s| s.parse().ok())
                .collect();
            // BusyBox prints min/avg/max without a deviation column.
            match fields[..] {
                [_, avg, _, dev] => {
                    latency = avg;
                    jitter = dev;
                }
                [_, avg, _] => latency = avg,
                _ => {}
            }
        }
    }

    let packet_loss = packet_loss?.clamp(0.0, 100.0);
    if packet_loss >= 100.0 {
        return Some(PingMetrics::empty(host));
    }
    Some(PingMetrics {
        host: host.to_string(),
        latency,
        jitter,
        packet_loss,
        is_reachable: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OK: &str = "\
PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.
64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=14.2 ms
64 bytes from 1.1.1.1: icmp_seq=2 ttl=57 time=15.9 ms
64 bytes from 1.1.1.1: icmp_seq=3 ttl=57 time=13.8 ms

--- 1.1.1.1 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 13.812/14.633/15.901/0.904 ms
";

    const MACOS_PARTIAL: &str = "\
--- 192.168.1.1 ping statistics ---
3 packets transmitted, 2 packets received, 33.3% packet loss
round-trip min/avg/max/stddev = 1.912/2.401/2.890/0.489 ms
";

    const BUSYBOX_OK: &str = "\
--- 1.1.1.1 ping statistics ---
3 packets transmitted, 3 packets received, 0% packet loss
round-trip min/avg/max = 13.812/14.633/15.901 ms
";

    const LINUX_UNREACHABLE: &str = "\
--- 10.0.0.1 ping statistics ---
3 packets transmitted, 0 received, +3 errors, 100% packet loss, time 2031ms
";

    #[test]
    fn parses_linux_summary() {
        let m = parse_ping_output(LINUX_OK, "1.1.1.1").unwrap();
        assert!(m.is_reachable);
        assert_eq!(m.packet_loss, 0.0);
        assert!((m.latency - 14.633).abs() < 1e-9);
        assert!((m.jitter - 0.904).abs() < 1e-9);
        assert_eq!(m.host, "1.1.1.1");
    }

    #[test]
    fn parses_busybox_summary_without_deviation() {
        let m = parse_ping_output(BUSYBOX_OK, "1.1.1.1").unwrap();
        assert!(m.is_reachable);
        assert_eq!(m.packet_loss, 0.0);
        assert!((m.latency - 14.633).abs() < 1e-9);
        assert_eq!(m.jitter, 0.0);
    }

    #[test]
    fn parses_bsd_summary_with_fractional_loss() {
        let m = parse_ping_output(MACOS_PARTIAL, "192.168.1.1").unwrap();
        assert!(m.is_reachable);
        assert!((m.packet_loss - 33.3).abs() < 1e-9);
        assert!((m.latency - 2.401).abs() < 1e-9);
    }

    #[test]
    fn total_loss_is_the_empty_value() {
        let m = parse_ping_output(LINUX_UNREACHABLE, "10.0.0.1").unwrap();
        assert_eq!(m, PingMetrics::empty("10.0.0.1"));
    }

    #[test]
    fn garbage_is_unparsable() {
        assert!(parse_ping_output("ping: unknown host nowhere", "nowhere").is_none());
    }
}
