//! Physical memory usage sampling.
//!
//! Reports utilization percent alongside used/total bytes so sinks can
//! render both "62.3%" and "9.8 / 15.7 GB" from one sample.

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::System;

use crate::error::Error;
use crate::sample::{CadenceTier, MemoryUsage, MetricCategory, MetricValue};
use crate::source::MetricSource;
use crate::Result;

/// Fast-tier memory usage source.
pub struct MemorySource {
    system: Mutex<System>,
}

impl MemorySource {
    /// Initialize memory access.
    ///
    /// Like CPU, failing here is fatal to collector startup: a host that
    /// cannot report total memory has no usable core metrics.
    pub fn new() -> Result<Self> {
        let mut system = System::new();
        system.refresh_memory();
        if system.total_memory() == 0 {
            return Err(Error::system("total memory reported as zero"));
        }
        Ok(Self { system: Mutex::new(system) })
    }
}

#[async_trait]
impl MetricSource for MemorySource {
    fn category(&self) -> MetricCategory {
        MetricCategory::Memory
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        let mut system = self.system.lock();
        system.refresh_memory();
        let used_bytes = system.used_memory();
        let total_bytes = system.total_memory();
        let percent = used_bytes as f64 / total_bytes as f64 * 100.0;
        Ok(MetricValue::Memory(MemoryUsage { percent, used_bytes, total_bytes }))
    }
}
