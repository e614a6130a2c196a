//! Network throughput sampling.
//!
//! Rates come from cumulative per-interface counters: each tick refreshes
//! the interface list's counters, sums them, and derives KB/s from the delta
//! against the previous observation. The first sample after startup reports
//! 0.0 in both directions.

mod traffic;

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::Networks;
use traffic::{TrafficSnapshot, TrafficTracker};

use crate::sample::{CadenceTier, MetricCategory, MetricValue, NetworkThroughput};
use crate::source::MetricSource;
use crate::Result;

/// Fast-tier network throughput source.
pub struct NetworkSource {
    inner: Mutex<NetworkState>,
}

struct NetworkState {
    networks: Networks,
    tracker: TrafficTracker,
}

impl NetworkSource {
    pub fn new() -> Self {
        let state =
            NetworkState { networks: Networks::new_with_refreshed_list(), tracker: TrafficTracker::new() };
        Self { inner: Mutex::new(state) }
    }
}

impl Default for NetworkSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricSource for NetworkSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::Network
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        state.networks.refresh();

        let mut rx_total = 0u64;
        let mut tx_total = 0u64;
        for (_name, data) in state.networks.iter() {
            rx_total += data.total_received();
            tx_total += data.total_transmitted();
        }

        let (rx_kb_per_sec, tx_kb_per_sec) = state.tracker.update(TrafficSnapshot::new(rx_total, tx_total));
        Ok(MetricValue::Network(NetworkThroughput { rx_kb_per_sec, tx_kb_per_sec }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_sample_reports_zero_rates() {
        let source = NetworkSource::new();
        let value = source.sample().await.unwrap();
        match value {
            MetricValue::Network(throughput) => {
                assert_eq!(throughput.rx_kb_per_sec, 0.0);
                assert_eq!(throughput.tx_kb_per_sec, 0.0);
            },
            other => panic!("expected network throughput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn subsequent_samples_stay_non_negative() {
        let source = NetworkSource::new();
        source.sample().await.unwrap();
        let value = source.sample().await.unwrap();
        match value {
            MetricValue::Network(throughput) => {
                assert!(throughput.rx_kb_per_sec >= 0.0);
                assert!(throughput.tx_kb_per_sec >= 0.0);
            },
            other => panic!("expected network throughput, got {other:?}"),
        }
    }
}
