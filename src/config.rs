//! Sampling configuration.
//!
//! The adjustable surface is deliberately small: the three cadence intervals
//! and the per-category change tolerances. Everything else (per-invocation
//! timeouts, channel depth, shutdown deadlines) is fixed by the sampler.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sample::{CadenceTier, MetricCategory};

/// Default interval for the fast cadence tier.
pub const DEFAULT_FAST_INTERVAL: Duration = Duration::from_secs(1);
/// Default interval for the medium cadence tier.
pub const DEFAULT_MEDIUM_INTERVAL: Duration = Duration::from_secs(5);
/// Default interval for the slow cadence tier.
pub const DEFAULT_SLOW_INTERVAL: Duration = Duration::from_secs(30);
/// Default change tolerance for float-valued categories.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Cadence intervals and change tolerances for a [`Sampler`](crate::sampler::Sampler).
///
/// ```
/// use std::time::Duration;
/// use host_metrics::config::SamplerConfig;
///
/// let mut config = SamplerConfig::default();
/// config.fast_interval = Duration::from_millis(500);
/// assert_eq!(config.medium_interval, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Interval for the fast tier (CPU, memory, network, GPU).
    pub fast_interval: Duration,
    /// Interval for the medium tier (process count).
    pub medium_interval: Duration,
    /// Interval for the slow tier (disk, uptime).
    pub slow_interval: Duration,
    /// Per-category change tolerances used by the gate.
    pub tolerances: Tolerances,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            fast_interval: DEFAULT_FAST_INTERVAL,
            medium_interval: DEFAULT_MEDIUM_INTERVAL,
            slow_interval: DEFAULT_SLOW_INTERVAL,
            tolerances: Tolerances::default(),
        }
    }
}

impl SamplerConfig {
    /// The configured interval for a cadence tier.
    pub fn interval_for(&self, tier: CadenceTier) -> Duration {
        match tier {
            CadenceTier::Fast => self.fast_interval,
            CadenceTier::Medium => self.medium_interval,
            CadenceTier::Slow => self.slow_interval,
        }
    }
}

/// Per-category change tolerances.
///
/// A float field of a sampled value counts as changed when it moved by at
/// least the category's tolerance (`|delta| >= tolerance`, so a tolerance of
/// `0.0` forwards every sample). Integer-valued categories (process count,
/// uptime) always compare exactly and ignore these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tolerances {
    /// CPU utilization, in percentage points.
    pub cpu: f64,
    /// Memory utilization, in percentage points.
    pub memory: f64,
    /// Disk utilization, in percentage points.
    pub disk: f64,
    /// Network throughput, in KB/s.
    pub network: f64,
    /// GPU fields (percent, degrees, watts, MHz alike).
    pub gpu: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::uniform(DEFAULT_TOLERANCE)
    }
}

impl Tolerances {
    /// The same tolerance for every float-valued category.
    pub fn uniform(tolerance: f64) -> Self {
        Self { cpu: tolerance, memory: tolerance, disk: tolerance, network: tolerance, gpu: tolerance }
    }

    /// Tolerance applied to a category's float fields. Exact-equality
    /// categories report `0.0`; their comparison never consults it.
    pub fn for_category(&self, category: MetricCategory) -> f64 {
        match category {
            MetricCategory::Cpu => self.cpu,
            MetricCategory::Memory => self.memory,
            MetricCategory::Disk => self.disk,
            MetricCategory::Network => self.network,
            MetricCategory::Gpu => self.gpu,
            MetricCategory::ProcessCount | MetricCategory::Uptime => 0.0,
        }
    }
}
