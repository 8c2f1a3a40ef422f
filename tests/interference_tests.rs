// Interference analysis tests

use wifidiag::interference::{self, CHANNELS_2_4GHZ, overlaps_2_4ghz};
use wifidiag::models::{ChannelScan, CongestionLevel, FrequencyBand, NearbyNetwork};

fn net(ssid: &str, channel: i32, rssi: i32) -> NearbyNetwork {
    NearbyNetwork::new(ssid, format!("bssid-{ssid}"), channel, rssi)
}

fn five_ghz_neighbours(n: usize) -> Vec<NearbyNetwork> {
    (0..n).map(|i| net(&format!("five{i}"), 36, -70)).collect()
}

#[test]
fn test_overlap_window() {
    assert!(overlaps_2_4ghz(6, 6));
    assert!(overlaps_2_4ghz(2, 6));
    assert!(!overlaps_2_4ghz(1, 6));
    assert!(!overlaps_2_4ghz(11, 6));
    assert!(!overlaps_2_4ghz(36, 36));
}

#[test]
fn test_congestion_covers_every_2_4_channel() {
    let networks = vec![net("a", 6, -50), net("b", 1, -60)];
    let congestion = interference::channel_congestion(&networks, 6, FrequencyBand::TwoPointFourGhz);
    let two: Vec<_> = congestion
        .iter()
        .filter(|c| c.band == FrequencyBand::TwoPointFourGhz)
        .collect();
    assert_eq!(two.len(), CHANNELS_2_4GHZ.len());

    let ch6 = two.iter().find(|c| c.channel == 6).unwrap();
    assert!(ch6.is_current_channel);
    assert_eq!(ch6.network_count, 1, "channel 1 is outside the overlap window");
    let ch3 = two.iter().find(|c| c.channel == 3).unwrap();
    assert_eq!(ch3.network_count, 2);
    assert_eq!(ch3.level, CongestionLevel::Moderate);
}

#[test]
fn test_5ghz_congestion_lists_only_occupied_or_current() {
    let networks = vec![net("a", 36, -50), net("b", 36, -60), net("c", 149, -70)];
    let congestion = interference::channel_congestion(&networks, 44, FrequencyBand::FiveGhz);
    let five: Vec<(i32, usize, bool)> = congestion
        .iter()
        .filter(|c| c.band == FrequencyBand::FiveGhz)
        .map(|c| (c.channel, c.network_count, c.is_current_channel))
        .collect();
    assert_eq!(five, vec![(36, 2, false), (44, 0, true), (149, 1, false)]);
}

#[test]
fn test_recommend_switch_to_5ghz() {
    let networks = vec![net("a", 1, -60), net("b", 6, -70), net("c", 11, -80)];
    let rec = interference::recommend(6, FrequencyBand::TwoPointFourGhz, &networks).unwrap();
    assert_eq!(rec.title, "Switch to 5 GHz");
    assert!(rec.actionable);
    assert!(rec.message.contains("0 networks vs 3"));
}

#[test]
fn test_recommend_channel_congestion_names_strong_neighbours() {
    let mut networks = vec![
        net("Loud", 36, -45),
        net("Louder", 36, -40),
        net("Quiet", 36, -75),
        net("Other", 36, -55),
    ];
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    let rec = interference::recommend(36, FrequencyBand::FiveGhz, &networks).unwrap();
    assert_eq!(rec.title, "Channel Congestion");
    assert!(rec.message.starts_with("4 networks share your channel"));
    assert!(rec.message.contains("\"Louder\", \"Loud\""));
    assert!(!rec.actionable);
}

#[test]
fn test_recommend_crowded_channel_without_strong_neighbours() {
    let networks = vec![net("a", 36, -70), net("b", 36, -75), net("c", 36, -80)];
    let rec = interference::recommend(36, FrequencyBand::FiveGhz, &networks).unwrap();
    assert_eq!(rec.title, "Crowded Channel");
    assert!(rec.message.contains("channel 36"));
}

#[test]
fn test_recommend_suboptimal_2_4_channel() {
    let mut networks = five_ghz_neighbours(4);
    networks.push(net("a", 3, -70));
    let rec = interference::recommend(3, FrequencyBand::TwoPointFourGhz, &networks).unwrap();
    assert_eq!(rec.title, "Suboptimal Channel");
}

#[test]
fn test_no_recommendation_on_quiet_non_overlapping_channel() {
    let mut networks = five_ghz_neighbours(4);
    networks.push(net("a", 11, -70));
    assert!(interference::recommend(6, FrequencyBand::TwoPointFourGhz, &networks).is_none());
    assert!(interference::recommend(149, FrequencyBand::FiveGhz, &[]).is_none());
}

#[test]
fn test_analyze_sorts_and_counts() {
    let result = interference::analyze(ChannelScan {
        current_channel: 36,
        current_band: FrequencyBand::FiveGhz,
        networks: vec![net("weak", 1, -85), net("strong", 36, -40), net("mid", 6, -60)],
    });
    let order: Vec<&str> = result.nearby_networks.iter().map(|n| n.ssid.as_str()).collect();
    assert_eq!(order, vec!["strong", "mid", "weak"]);
    assert_eq!(result.two_ghz_network_count(), 2);
    assert_eq!(result.five_ghz_network_count(), 1);
    assert_eq!(result.networks_on_same_channel().count(), 1);
    assert_eq!(
        result
            .congestion_for(36, FrequencyBand::FiveGhz)
            .map(|c| c.network_count),
        Some(1)
    );
    assert!(result.recommendation.is_none());
}

#[test]
fn test_channel_six_counts_same_and_overlapping() {
    let networks = vec![
        net("a", 6, -50),
        net("b", 6, -55),
        net("c", 6, -65),
        net("d", 7, -70),
        net("e", 1, -75),
    ];
    let result = interference::analyze(ChannelScan {
        current_channel: 6,
        current_band: FrequencyBand::TwoPointFourGhz,
        networks,
    });
    assert_eq!(result.networks_on_same_channel().count(), 3);
    let ch6 = result
        .congestion_for(6, FrequencyBand::TwoPointFourGhz)
        .unwrap();
    assert_eq!(ch6.network_count, 4, "channel 7 overlaps, channel 1 does not");
}

#[test]
fn test_crowded_2_4_band_recommends_5ghz() {
    let mut networks: Vec<NearbyNetwork> =
        (0..15).map(|i| net(&format!("two{i}"), 1 + i % 11, -70)).collect();
    networks.extend((0..2).map(|i| net(&format!("five{i}"), 149, -70)));
    let rec = interference::recommend(6, FrequencyBand::TwoPointFourGhz, &networks).unwrap();
    assert!(rec.actionable);
    assert!(rec.message.contains("2 networks vs 15"));
}
