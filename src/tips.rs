// Heuristic diagnostic tips derived from the latest link and ping metrics.

use crate::models::{FrequencyBand, PingMetrics, Severity, Tip, WifiMetrics};

/// Evaluates every rule independently; returns tips with critical ones first.
/// Within the same severity, rule order is kept. A link with no SSID (empty
/// metrics) yields no tips.
pub fn analyze(wifi: &WifiMetrics, router: &PingMetrics, internet: &PingMetrics) -> Vec<Tip> {
    let mut tips = Vec::new();
    if !wifi.is_connected() {
        return tips;
    }
    let on_2_4 = wifi.band == FrequencyBand::TwoPointFourGhz;

    if wifi.rssi < -80 {
        tips.push(Tip::new(
            "Very Weak Signal",
            "Move closer to your router or remove obstructions.",
            Severity::Critical,
        ));
    }

    if internet.packet_loss > 10.0 {
        tips.push(Tip::new(
            "High Packet Loss",
            "Your connection is unstable. Try restarting your router.",
            Severity::Critical,
        ));
    }

    if on_2_4 && wifi.link_rate < 150.0 {
        tips.push(Tip::new(
            "Slow Wi-Fi Standard",
            "Using Wi-Fi 4. Try connecting to 5 GHz for better speeds.",
            Severity::Warning,
        ));
    }

    if (-80..-70).contains(&wifi.rssi) {
        tips.push(Tip::new(
            "Weak Signal",
            "Consider moving closer to your router.",
            Severity::Warning,
        ));
    }

    if wifi.noise > -80 {
        tips.push(Tip::new(
            "Interference Detected",
            "Other devices may be affecting your connection.",
            Severity::Warning,
        ));
    }

    if wifi.snr() < 20 && wifi.rssi >= -70 {
        tips.push(Tip::new(
            "Poor Signal Quality",
            "Try changing your router's channel to reduce interference.",
            Severity::Warning,
        ));
    }

    if router.is_reachable && router.latency > 10.0 {
        tips.push(Tip::new(
            "Router Latency",
            "Your local network may be congested.",
            Severity::Warning,
        ));
    }

    if internet.is_reachable && internet.latency > 100.0 {
        tips.push(Tip::new(
            "High Latency",
            "This may affect video calls and gaming.",
            Severity::Warning,
        ));
    }

    if internet.is_reachable && internet.jitter > 30.0 {
        tips.push(Tip::new(
            "Unstable Connection",
            "High jitter may cause audio/video issues.",
            Severity::Warning,
        ));
    }

    if on_2_4 && wifi.rssi > -60 && wifi.link_rate >= 150.0 {
        tips.push(Tip::new(
            "5 GHz Available?",
            "You have good signal. 5 GHz may offer faster speeds.",
            Severity::Info,
        ));
    }

    // sort_by is stable
    tips.sort_by(|a, b| b.severity.cmp(&a.severity));
    tips
}

/// Severity of the first (most severe) tip, if any.
pub fn worst_severity(tips: &[Tip]) -> Option<Severity> {
    tips.first().map(|t| t.severity)
}
