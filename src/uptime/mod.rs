//! System uptime sampling.

use async_trait::async_trait;
use sysinfo::System;

use crate::sample::{CadenceTier, MetricCategory, MetricValue};
use crate::source::MetricSource;
use crate::Result;

/// Slow-tier uptime source, in whole seconds since boot. Formatting into
/// hours and minutes is left to the sink.
#[derive(Debug, Default)]
pub struct UptimeSource;

impl UptimeSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricSource for UptimeSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::Uptime
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        Ok(MetricValue::Uptime(System::uptime()))
    }
}
