//! Vendor-agnostic fallback over the DRM sysfs tree.
//!
//! Accepts the first card that exposes a busy or VRAM counter and reports
//! only what it can read. Cards with richer interfaces are claimed by the
//! vendor backends before this one runs.

use std::path::{Path, PathBuf};

use super::sysfs::{self, read_u64};
use super::types::{GpuStats, GpuVendor};
use super::GpuSource;
use crate::error::Error;
use crate::Result;

#[derive(Debug)]
pub(crate) struct GenericGpu {
    device: PathBuf,
}

impl GenericGpu {
    pub(crate) fn try_new() -> Result<Self> {
        Self::scan(Path::new(sysfs::DRM_ROOT))
    }

    pub(crate) fn scan(root: &Path) -> Result<Self> {
        for device in sysfs::card_device_dirs(root) {
            if device.join("gpu_busy_percent").exists() || device.join("mem_info_vram_total").exists() {
                return Ok(Self { device });
            }
        }
        Err(Error::unavailable("no drm card with readable counters"))
    }
}

impl GpuSource for GenericGpu {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Generic
    }

    fn read_stats(&self) -> Result<GpuStats> {
        let stats = GpuStats {
            name: "GPU".to_string(),
            utilization_percent: read_u64(&self.device.join("gpu_busy_percent")).map(|percent| percent as f64),
            vram_used_bytes: read_u64(&self.device.join("mem_info_vram_used")),
            vram_total_bytes: read_u64(&self.device.join("mem_info_vram_total")),
            ..GpuStats::default()
        };
        if stats.utilization_percent.is_none() && stats.vram_total_bytes.is_none() {
            return Err(Error::source("no readable counters on drm card"));
        }
        Ok(stats)
    }
}
