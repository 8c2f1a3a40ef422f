// In-memory rolling history: one bounded FIFO per tracked metric.
// Only successful probe samples are recorded; nothing is persisted across restarts.

use serde::Serialize;
use std::collections::VecDeque;

/// Default number of samples kept per metric (one minute at the default 1s cadence).
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Fixed-capacity FIFO. Appending at capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct RollingHistory<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    /// Oldest to newest.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.buffer.back()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<T: Clone> RollingHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }
}

impl<T> Default for RollingHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Statistics return 0 for an empty history; callers treat that as "no data".
impl<T: Copy + Into<f64>> RollingHistory<T> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.buffer.iter().map(|v| (*v).into()).sum();
        sum / self.buffer.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.buffer
            .iter()
            .map(|v| (*v).into())
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.buffer
            .iter()
            .map(|v| (*v).into())
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub fn series(&self) -> MetricSeries {
        MetricSeries {
            values: self.buffer.iter().map(|v| (*v).into()).collect(),
            average: self.average(),
            min: self.min(),
            max: self.max(),
        }
    }
}

/// Serializable view of one history (values plus derived stats).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub values: Vec<f64>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// All histories owned by the sampler.
#[derive(Debug, Clone)]
pub struct MetricHistories {
    pub rssi: RollingHistory<f64>,
    pub noise: RollingHistory<f64>,
    pub link_rate: RollingHistory<f64>,
    pub router_latency: RollingHistory<f64>,
    pub router_jitter: RollingHistory<f64>,
    pub router_loss: RollingHistory<f64>,
    pub internet_latency: RollingHistory<f64>,
    pub internet_jitter: RollingHistory<f64>,
    pub internet_loss: RollingHistory<f64>,
    pub dns_lookup: RollingHistory<f64>,
}

impl MetricHistories {
    pub fn new(capacity: usize) -> Self {
        Self {
            rssi: RollingHistory::new(capacity),
            noise: RollingHistory::new(capacity),
            link_rate: RollingHistory::new(capacity),
            router_latency: RollingHistory::new(capacity),
            router_jitter: RollingHistory::new(capacity),
            router_loss: RollingHistory::new(capacity),
            internet_latency: RollingHistory::new(capacity),
            internet_jitter: RollingHistory::new(capacity),
            internet_loss: RollingHistory::new(capacity),
            dns_lookup: RollingHistory::new(capacity),
        }
    }

    /// Drops every sample (the "reset stats" action); capacities are kept.
    pub fn clear(&mut self) {
        for h in self.all_mut() {
            h.clear();
        }
    }

    fn all_mut(&mut self) -> [&mut RollingHistory<f64>; 10] {
        [
            &mut self.rssi,
            &mut self.noise,
            &mut self.link_rate,
            &mut self.router_latency,
            &mut self.router_jitter,
            &mut self.router_loss,
            &mut self.internet_latency,
            &mut self.internet_jitter,
            &mut self.internet_loss,
            &mut self.dns_lookup,
        ]
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            rssi: self.rssi.series(),
            noise: self.noise.series(),
            link_rate: self.link_rate.series(),
            router_latency: self.router_latency.series(),
            router_jitter: self.router_jitter.series(),
            router_loss: self.router_loss.series(),
            internet_latency: self.internet_latency.series(),
            internet_jitter: self.internet_jitter.series(),
            internet_loss: self.internet_loss.series(),
            dns_lookup: self.dns_lookup.series(),
        }
    }
}

impl Default for MetricHistories {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Wire form of [`MetricHistories`] for GET /api/history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub rssi: MetricSeries,
    pub noise: MetricSeries,
    pub link_rate: MetricSeries,
    pub router_latency: MetricSeries,
    pub router_jitter: MetricSeries,
    pub router_loss: MetricSeries,
    pub internet_latency: MetricSeries,
    pub internet_jitter: MetricSeries,
    pub internet_loss: MetricSeries,
    pub dns_lookup: MetricSeries,
}
