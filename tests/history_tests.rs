// Rolling history tests

use wifidiag::history::{DEFAULT_HISTORY_CAPACITY, MetricHistories, RollingHistory};

#[test]
fn test_append_evicts_oldest_at_capacity() {
    let mut h = RollingHistory::new(3);
    for v in 1..=5 {
        h.append(v);
    }
    assert_eq!(h.len(), 3);
    assert_eq!(h.values().copied().collect::<Vec<i32>>(), vec![3, 4, 5]);
    assert_eq!(h.latest(), Some(&5));
}

#[test]
fn test_sixty_first_sample_evicts_first() {
    let mut h: RollingHistory<f64> = RollingHistory::default();
    assert_eq!(h.capacity(), DEFAULT_HISTORY_CAPACITY);
    for i in 0..=DEFAULT_HISTORY_CAPACITY {
        h.append(i as f64);
    }
    assert_eq!(h.len(), DEFAULT_HISTORY_CAPACITY);
    assert_eq!(h.values().next(), Some(&1.0));
}

#[test]
fn test_stats_on_empty_history_are_zero() {
    let h: RollingHistory<f64> = RollingHistory::new(10);
    assert!(h.is_empty());
    assert_eq!(h.average(), 0.0);
    assert_eq!(h.min(), 0.0);
    assert_eq!(h.max(), 0.0);
    assert_eq!(h.latest(), None);
}

#[test]
fn test_stats_over_samples() {
    let mut h = RollingHistory::new(10);
    for v in [-60, -50, -70] {
        h.append(v);
    }
    assert_eq!(h.average(), -60.0);
    assert_eq!(h.min(), -70.0);
    assert_eq!(h.max(), -50.0);
}

#[test]
fn test_stats_follow_eviction() {
    let mut h = RollingHistory::new(2);
    h.append(100.0);
    h.append(10.0);
    h.append(20.0);
    assert_eq!(h.max(), 20.0);
    assert_eq!(h.average(), 15.0);
}

#[test]
fn test_zero_capacity_is_clamped_to_one() {
    let mut h = RollingHistory::new(0);
    h.append(1.0);
    h.append(2.0);
    assert_eq!(h.capacity(), 1);
    assert_eq!(h.to_vec(), vec![2.0]);
}

#[test]
fn test_clear_keeps_capacity() {
    let mut h = RollingHistory::new(4);
    h.append(1.0);
    h.clear();
    assert!(h.is_empty());
    assert_eq!(h.capacity(), 4);
}

#[test]
fn test_metric_histories_summary() {
    let mut histories = MetricHistories::new(5);
    histories.rssi.append(-50.0);
    histories.rssi.append(-60.0);
    histories.dns_lookup.append(12.0);

    let summary = histories.summary();
    assert_eq!(summary.rssi.values, vec![-50.0, -60.0]);
    assert_eq!(summary.rssi.average, -55.0);
    assert_eq!(summary.dns_lookup.max, 12.0);
    assert!(summary.internet_latency.values.is_empty());

    let json = serde_json::to_value(&summary).unwrap();
    assert!(json.get("routerLatency").is_some());
    assert!(json.get("internetLoss").is_some());

    histories.clear();
    assert!(histories.rssi.is_empty());
    assert_eq!(histories.rssi.capacity(), 5);
}
