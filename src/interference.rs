// Channel interference analysis for one scan: per-channel congestion and at most
// one recommendation. Runs only on explicit request, never from the tick loop.

use chrono::Utc;

use crate::models::{
    ChannelCongestion, ChannelScan, FrequencyBand, InterferenceRecommendation,
    InterferenceScanResult, NearbyNetwork, count_in_band,
};

/// 2.4 GHz channels reported in the congestion list.
pub const CHANNELS_2_4GHZ: [i32; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

/// 5 GHz channels considered for congestion (UNII-1 to UNII-3).
pub const CHANNELS_5GHZ: [i32; 25] = [
    36, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140, 144,
    149, 153, 157, 161, 165,
];

/// 2.4 GHz channels that do not overlap each other.
pub const NON_OVERLAPPING_2_4GHZ: [i32; 3] = [1, 6, 11];

/// Same-channel neighbours needed before crowding is reported.
const CROWDED_THRESHOLD: usize = 3;
/// Neighbours stronger than this (dBm) are named as competitors.
const STRONG_COMPETITOR_RSSI: i32 = -60;

pub fn analyze(scan: ChannelScan) -> InterferenceScanResult {
    let ChannelScan {
        current_channel,
        current_band,
        mut networks,
    } = scan;
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi));

    let channel_congestion = channel_congestion(&networks, current_channel, current_band);
    let recommendation = recommend(current_channel, current_band, &networks);

    tracing::debug!(
        operation = "interference_scan",
        current_channel,
        networks = networks.len(),
        has_recommendation = recommendation.is_some(),
        "interference analysis complete"
    );

    InterferenceScanResult {
        current_channel,
        current_band,
        nearby_networks: networks,
        channel_congestion,
        recommendation,
        scan_time: Utc::now(),
    }
}

/// Adjacent 2.4 GHz channels bleed into each other: anything within 4 channels counts.
pub fn overlaps_2_4ghz(network_channel: i32, target_channel: i32) -> bool {
    let in_range = |c: i32| (1..=11).contains(&c);
    in_range(network_channel)
        && in_range(target_channel)
        && (network_channel - target_channel).abs() < 5
}

pub fn channel_congestion(
    networks: &[NearbyNetwork],
    current_channel: i32,
    current_band: FrequencyBand,
) -> Vec<ChannelCongestion> {
    let mut congestion = Vec::with_capacity(CHANNELS_2_4GHZ.len());

    for channel in CHANNELS_2_4GHZ {
        let count = networks
            .iter()
            .filter(|n| {
                n.band == FrequencyBand::TwoPointFourGhz && overlaps_2_4ghz(n.channel, channel)
            })
            .count();
        congestion.push(ChannelCongestion::new(
            channel,
            FrequencyBand::TwoPointFourGhz,
            count,
            channel == current_channel && current_band == FrequencyBand::TwoPointFourGhz,
        ));
    }

    for channel in CHANNELS_5GHZ {
        let count = networks
            .iter()
            .filter(|n| n.band == FrequencyBand::FiveGhz && n.channel == channel)
            .count();
        if count > 0 || channel == current_channel {
            congestion.push(ChannelCongestion::new(
                channel,
                FrequencyBand::FiveGhz,
                count,
                channel == current_channel && current_band == FrequencyBand::FiveGhz,
            ));
        }
    }

    congestion
}

/// First matching rule wins. `networks` must be sorted strongest first so that
/// named competitors are the strongest ones.
pub fn recommend(
    current_channel: i32,
    current_band: FrequencyBand,
    networks: &[NearbyNetwork],
) -> Option<InterferenceRecommendation> {
    let on_2_4 = current_band == FrequencyBand::TwoPointFourGhz;
    let two_count = count_in_band(networks, FrequencyBand::TwoPointFourGhz);
    let five_count = count_in_band(networks, FrequencyBand::FiveGhz);

    if on_2_4 && five_count < two_count / 2 {
        return Some(InterferenceRecommendation {
            title: "Switch to 5 GHz".into(),
            message: format!(
                "5 GHz band has {} networks vs {} on 2.4 GHz. Look for your network's 5G variant (often named \"YourNetwork-5G\" or \"YourNetwork_5GHz\").",
                five_count, two_count
            ),
            actionable: true,
        });
    }

    let same_channel: Vec<&NearbyNetwork> = networks
        .iter()
        .filter(|n| n.channel == current_channel && n.band == current_band)
        .collect();

    if same_channel.len() >= CROWDED_THRESHOLD {
        let strong: Vec<String> = same_channel
            .iter()
            .filter(|n| n.rssi > STRONG_COMPETITOR_RSSI)
            .take(2)
            .map(|n| format!("\"{}\"", n.ssid))
            .collect();
        if !strong.is_empty() {
            return Some(InterferenceRecommendation {
                title: "Channel Congestion".into(),
                message: format!(
                    "{} networks share your channel including strong signals from {}. If possible, switch to 5 GHz.",
                    same_channel.len(),
                    strong.join(", ")
                ),
                actionable: false,
            });
        }
        return Some(InterferenceRecommendation {
            title: "Crowded Channel".into(),
            message: format!(
                "{} networks are competing on channel {}. This may cause slowdowns during peak usage.",
                same_channel.len(),
                current_channel
            ),
            actionable: false,
        });
    }

    if on_2_4 && !NON_OVERLAPPING_2_4GHZ.contains(&current_channel) {
        return Some(InterferenceRecommendation {
            title: "Suboptimal Channel".into(),
            message: format!(
                "Channel {} overlaps with adjacent channels. Channels 1, 6, or 11 are recommended for 2.4 GHz.",
                current_channel
            ),
            actionable: false,
        });
    }

    None
}
