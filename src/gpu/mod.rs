//! Vendor-abstracted GPU metrics.
//!
//! GPU hardware is the one category where the backing API varies wildly
//! between machines, so everything funnels through a single capability:
//! probe once at startup, then query the selected backend each tick.
//!
//! # Probe order
//!
//! 1. **NVIDIA** via NVML (`nvml-wrapper`): init plus a device-count check.
//! 2. **AMD** via the amdgpu sysfs interface (vendor `0x1002` with a
//!    `gpu_busy_percent` counter).
//! 3. **Generic** DRM performance counters, vendor-agnostic: usage and VRAM
//!    only.
//! 4. **Disabled** stub: every query reports unavailable without touching
//!    any SDK again.
//!
//! A vendor failing to probe only disqualifies that vendor. The selected
//! backend (and its SDK handle) lives for the process lifetime and is
//! released when the collector shuts down; the chain is never re-run.

mod amd;
mod generic;
mod nvidia;
mod sysfs;
pub mod types;

pub use types::{GpuStats, GpuVendor};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::error::Error;
use crate::sample::{CadenceTier, MetricCategory, MetricValue};
use crate::source::MetricSource;
use crate::Result;

/// One vendor's GPU query capability. All backends produce the same output
/// shape; fields a path cannot measure stay `None`.
#[cfg_attr(test, automock)]
pub trait GpuSource: Send + Sync {
    fn vendor(&self) -> GpuVendor;
    fn read_stats(&self) -> Result<GpuStats>;
}

/// The stub installed when no vendor path works.
#[derive(Debug, Default)]
pub struct DisabledGpu;

impl GpuSource for DisabledGpu {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Disabled
    }

    fn read_stats(&self) -> Result<GpuStats> {
        Err(Error::unavailable("no supported gpu detected"))
    }
}

/// Probe vendors in fallback order and return the first usable backend.
///
/// Probing with the same hardware state always lands on the same vendor;
/// callers hold the returned backend for the process lifetime instead of
/// re-running the chain.
pub fn probe() -> Box<dyn GpuSource> {
    match nvidia::NvidiaGpu::try_new() {
        Ok(gpu) => {
            debug!(name = %gpu.name(), "nvidia gpu backend selected");
            return Box::new(gpu);
        },
        Err(err) => debug!(error = %err, "nvidia probe failed"),
    }
    match amd::AmdGpu::try_new() {
        Ok(gpu) => {
            debug!("amd gpu backend selected");
            return Box::new(gpu);
        },
        Err(err) => debug!(error = %err, "amd probe failed"),
    }
    match generic::GenericGpu::try_new() {
        Ok(gpu) => {
            debug!("generic drm counter backend selected");
            return Box::new(gpu);
        },
        Err(err) => debug!(error = %err, "generic counter probe failed"),
    }
    warn!("no gpu backend available, gpu metrics disabled");
    Box::new(DisabledGpu)
}

/// Adapter exposing the probed backend as a fast-tier [`MetricSource`].
pub struct GpuMetricSource {
    backend: Box<dyn GpuSource>,
}

impl GpuMetricSource {
    pub fn new(backend: Box<dyn GpuSource>) -> Self {
        Self { backend }
    }

    pub fn vendor(&self) -> GpuVendor {
        self.backend.vendor()
    }
}

#[async_trait]
impl MetricSource for GpuMetricSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::Gpu
    }

    fn tier(&self) -> CadenceTier {
        self.category().default_tier()
    }

    async fn sample(&self) -> Result<MetricValue> {
        self.backend.read_stats().map(MetricValue::Gpu)
    }
}
