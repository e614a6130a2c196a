//! The normalized data model every metric source produces.
//!
//! A [`MetricSample`] is immutable once produced: one category, an optional
//! unit-tagged [`MetricValue`] payload, a timestamp and a [`Validity`] flag.
//! Invalid samples (timeouts, failures, absent hardware) carry no value.
//!
//! Each value variant also knows its change rule, used by the gate to decide
//! whether a fresh sample is worth forwarding: exact comparison for integer
//! counts, epsilon comparison for float fields, field-wise comparison for
//! compound payloads.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::gpu::GpuStats;

/// The seven metric categories this crate samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    Cpu,
    Memory,
    Disk,
    Network,
    Gpu,
    ProcessCount,
    Uptime,
}

impl MetricCategory {
    /// All categories, in no particular order of importance.
    pub const ALL: [MetricCategory; 7] = [
        MetricCategory::Cpu,
        MetricCategory::Memory,
        MetricCategory::Disk,
        MetricCategory::Network,
        MetricCategory::Gpu,
        MetricCategory::ProcessCount,
        MetricCategory::Uptime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Cpu => "cpu",
            MetricCategory::Memory => "memory",
            MetricCategory::Disk => "disk",
            MetricCategory::Network => "network",
            MetricCategory::Gpu => "gpu",
            MetricCategory::ProcessCount => "process_count",
            MetricCategory::Uptime => "uptime",
        }
    }

    /// The cadence tier a category is sampled on by default: CPU, memory,
    /// network and GPU on the fast tier, process count on the medium tier,
    /// disk and uptime on the slow tier.
    pub fn default_tier(&self) -> CadenceTier {
        match self {
            MetricCategory::Cpu | MetricCategory::Memory | MetricCategory::Network | MetricCategory::Gpu => {
                CadenceTier::Fast
            },
            MetricCategory::ProcessCount => CadenceTier::Medium,
            MetricCategory::Disk | MetricCategory::Uptime => CadenceTier::Slow,
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed polling frequency class assigned to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CadenceTier {
    Fast,
    Medium,
    Slow,
}

impl CadenceTier {
    pub const ALL: [CadenceTier; 3] = [CadenceTier::Fast, CadenceTier::Medium, CadenceTier::Slow];
}

impl fmt::Display for CadenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CadenceTier::Fast => "fast",
            CadenceTier::Medium => "medium",
            CadenceTier::Slow => "slow",
        };
        f.write_str(name)
    }
}

/// Whether a sample carries a measurement, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// The sample carries a fresh measurement.
    Valid,
    /// The category's backing API is absent ("N/A"); permanent.
    Unavailable,
    /// The query timed out or failed; retried on the next tick.
    Failed,
}

/// CPU utilization across all logical cores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    /// Utilization in percent, averaged over all cores.
    pub percent: f64,
    /// Logical core count.
    pub cores: usize,
}

/// Physical memory usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub percent: f64,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

/// Aggregate filesystem usage across real disks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub percent: f64,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

/// Network throughput derived from cumulative interface counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkThroughput {
    /// Download rate in KB/s, summed over all interfaces.
    pub rx_kb_per_sec: f64,
    /// Upload rate in KB/s, summed over all interfaces.
    pub tx_kb_per_sec: f64,
}

/// A unit-tagged measurement, one variant per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Cpu(CpuUsage),
    Memory(MemoryUsage),
    Disk(DiskUsage),
    Network(NetworkThroughput),
    Gpu(GpuStats),
    ProcessCount(u64),
    /// Seconds since boot.
    Uptime(u64),
}

impl MetricValue {
    /// The category this value belongs to.
    pub fn category(&self) -> MetricCategory {
        match self {
            MetricValue::Cpu(_) => MetricCategory::Cpu,
            MetricValue::Memory(_) => MetricCategory::Memory,
            MetricValue::Disk(_) => MetricCategory::Disk,
            MetricValue::Network(_) => MetricCategory::Network,
            MetricValue::Gpu(_) => MetricCategory::Gpu,
            MetricValue::ProcessCount(_) => MetricCategory::ProcessCount,
            MetricValue::Uptime(_) => MetricCategory::Uptime,
        }
    }

    /// Unit label of the primary measurement. Compound payloads (GPU) carry
    /// per-field units and report an empty label here.
    pub fn unit(&self) -> &'static str {
        match self {
            MetricValue::Cpu(_) | MetricValue::Memory(_) | MetricValue::Disk(_) => "%",
            MetricValue::Network(_) => "KB/s",
            MetricValue::Gpu(_) | MetricValue::ProcessCount(_) => "",
            MetricValue::Uptime(_) => "s",
        }
    }

    /// The per-category change rule: `true` when this value should be
    /// forwarded given `previous` was the last published one.
    ///
    /// Integer counts compare exactly; float fields compare against the
    /// tolerance (`|delta| >= tolerance`); compound payloads change when any
    /// field changes. Values of different variants always differ.
    pub fn differs_from(&self, previous: &MetricValue, tolerance: f64) -> bool {
        match (self, previous) {
            (MetricValue::Cpu(a), MetricValue::Cpu(b)) => {
                float_differs(a.percent, b.percent, tolerance) || a.cores != b.cores
            },
            (MetricValue::Memory(a), MetricValue::Memory(b)) => float_differs(a.percent, b.percent, tolerance),
            (MetricValue::Disk(a), MetricValue::Disk(b)) => float_differs(a.percent, b.percent, tolerance),
            (MetricValue::Network(a), MetricValue::Network(b)) => {
                float_differs(a.rx_kb_per_sec, b.rx_kb_per_sec, tolerance)
                    || float_differs(a.tx_kb_per_sec, b.tx_kb_per_sec, tolerance)
            },
            (MetricValue::Gpu(a), MetricValue::Gpu(b)) => a.differs_from(b, tolerance),
            (MetricValue::ProcessCount(a), MetricValue::ProcessCount(b)) => a != b,
            (MetricValue::Uptime(a), MetricValue::Uptime(b)) => a != b,
            _ => true,
        }
    }
}

pub(crate) fn float_differs(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() >= tolerance
}

/// One sampled reading of one category. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub category: MetricCategory,
    /// `Some` iff the sample is valid.
    pub value: Option<MetricValue>,
    pub timestamp: SystemTime,
    pub validity: Validity,
}

impl MetricSample {
    /// A valid sample; the category is derived from the value.
    pub fn valid(value: MetricValue) -> Self {
        Self {
            category: value.category(),
            value: Some(value),
            timestamp: SystemTime::now(),
            validity: Validity::Valid,
        }
    }

    /// An invalid sample for `category`; carries no value.
    pub fn invalid(category: MetricCategory, validity: Validity) -> Self {
        debug_assert!(validity != Validity::Valid);
        Self { category, value: None, timestamp: SystemTime::now(), validity }
    }

    /// Replace the timestamp, mostly useful in tests.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.validity, Validity::Valid)
    }
}
