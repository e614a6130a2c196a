//! Throughput derivation from cumulative interface counters.

use std::time::Instant;

/// Cumulative byte counters observed at one instant, summed over all
/// interfaces.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrafficSnapshot {
    pub(crate) rx_bytes: u64,
    pub(crate) tx_bytes: u64,
    pub(crate) taken_at: Instant,
}

impl TrafficSnapshot {
    pub(crate) fn new(rx_bytes: u64, tx_bytes: u64) -> Self {
        Self { rx_bytes, tx_bytes, taken_at: Instant::now() }
    }
}

/// Keeps the previous snapshot and turns counter deltas into KB/s rates.
#[derive(Debug, Default)]
pub(crate) struct TrafficTracker {
    previous: Option<TrafficSnapshot>,
}

impl TrafficTracker {
    pub(crate) fn new() -> Self {
        Self { previous: None }
    }

    /// `(rx, tx)` rates in KB/s between the previous observation and
    /// `current`. The first observation reports zero; counter resets
    /// (interface bounce) saturate to zero rather than going negative.
    pub(crate) fn update(&mut self, current: TrafficSnapshot) -> (f64, f64) {
        let rates = match self.previous {
            Some(previous) => rates_between(previous, current),
            None => (0.0, 0.0),
        };
        self.previous = Some(current);
        rates
    }
}

fn rates_between(previous: TrafficSnapshot, current: TrafficSnapshot) -> (f64, f64) {
    let elapsed = current.taken_at.duration_since(previous.taken_at).as_secs_f64();
    if elapsed <= 0.0 {
        return (0.0, 0.0);
    }
    let rx = current.rx_bytes.saturating_sub(previous.rx_bytes) as f64 / 1024.0 / elapsed;
    let tx = current.tx_bytes.saturating_sub(previous.tx_bytes) as f64 / 1024.0 / elapsed;
    (rx, tx)
}
