//! CPU utilization sampling.
//!
//! Backed by `sysinfo`: total utilization averaged over all logical cores,
//! plus the core count. Usage percentages need two refreshes spaced apart to
//! mean anything, so construction primes the counters once; the fast cadence
//! (1 s) comfortably exceeds [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`].

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::System;

use crate::error::Error;
use crate::sample::{CadenceTier, CpuUsage, MetricCategory, MetricValue};
use crate::source::MetricSource;
use crate::Result;

/// Fast-tier CPU utilization source.
pub struct CpuSource {
    system: Mutex<System>,
}

impl CpuSource {
    /// Initialize CPU access and prime the usage counters.
    ///
    /// Failing here is fatal to collector startup: core CPU metrics have no
    /// fallback path.
    pub fn new() -> Result<Self> {
        let mut system = System::new();
        system.refresh_cpu_usage();
        if system.cpus().is_empty() {
            return Err(Error::system("no CPUs visible to the OS probe"));
        }
        Ok(Self { system: Mutex::new(system) })
    }
}

#[async_trait]
impl MetricSource for CpuSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::Cpu
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        let mut system = self.system.lock();
        system.refresh_cpu_usage();
        let percent = f64::from(system.global_cpu_info().cpu_usage());
        let cores = system.cpus().len();
        Ok(MetricValue::Cpu(CpuUsage { percent, cores }))
    }
}
