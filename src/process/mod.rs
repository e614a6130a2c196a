//! Process count sampling.

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::System;

use crate::sample::{CadenceTier, MetricCategory, MetricValue};
use crate::source::MetricSource;
use crate::Result;

/// Medium-tier running-process count source.
pub struct ProcessCountSource {
    system: Mutex<System>,
}

impl ProcessCountSource {
    pub fn new() -> Self {
        Self { system: Mutex::new(System::new()) }
    }
}

impl Default for ProcessCountSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricSource for ProcessCountSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::ProcessCount
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        let mut system = self.system.lock();
        system.refresh_processes();
        Ok(MetricValue::ProcessCount(system.processes().len() as u64))
    }
}
