//! Filesystem usage sampling.
//!
//! Disk enumeration can stall on sleepy or network-backed volumes, which is
//! why this source lives on the slow tier and runs the enumeration under
//! `spawn_blocking`. Hosts without visible disks (minimal containers)
//! degrade to an unavailable sample instead of failing the tier.

use std::collections::HashSet;

use async_trait::async_trait;
use sysinfo::Disks;

use crate::error::Error;
use crate::sample::{CadenceTier, DiskUsage, MetricCategory, MetricValue};
use crate::source::MetricSource;
use crate::Result;

/// Slow-tier aggregate filesystem usage source.
#[derive(Debug, Default)]
pub struct DiskSource;

impl DiskSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricSource for DiskSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::Disk
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        let (used_bytes, total_bytes) = tokio::task::spawn_blocking(aggregate_disk_usage)
            .await
            .map_err(|err| Error::system(format!("disk enumeration task failed: {err}")))?;
        if total_bytes == 0 {
            return Err(Error::unavailable("no disks enumerated"));
        }
        let percent = used_bytes as f64 / total_bytes as f64 * 100.0;
        Ok(MetricValue::Disk(DiskUsage { percent, used_bytes, total_bytes }))
    }
}

/// Sum used/total space over real disks, counting each device once even
/// when it backs several mount points.
fn aggregate_disk_usage() -> (u64, u64) {
    let disks = Disks::new_with_refreshed_list();
    let mut seen = HashSet::new();
    let mut used = 0u64;
    let mut total = 0u64;
    for disk in disks.iter() {
        let key = (disk.name().to_os_string(), disk.total_space());
        if !seen.insert(key) {
            continue;
        }
        total += disk.total_space();
        used += disk.total_space().saturating_sub(disk.available_space());
    }
    (used, total)
}
