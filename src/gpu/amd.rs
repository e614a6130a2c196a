//! AMD backend over the amdgpu sysfs interface.
//!
//! Utilization and VRAM come from the card's device directory; temperature,
//! power, fan duty and clock come from its hwmon directory when present.
//! Missing files read as absent fields, never zero.

use std::path::{Path, PathBuf};

use super::sysfs::{self, read_u64};
use super::types::{GpuStats, GpuVendor};
use super::GpuSource;
use crate::error::Error;
use crate::Result;

const AMD_VENDOR_ID: &str = "0x1002";

#[derive(Debug)]
pub(crate) struct AmdGpu {
    device: PathBuf,
    hwmon: Option<PathBuf>,
    name: String,
}

impl AmdGpu {
    pub(crate) fn try_new() -> Result<Self> {
        Self::scan(Path::new(sysfs::DRM_ROOT))
    }

    /// Probe `root` for an amdgpu card exposing the busy counter.
    pub(crate) fn scan(root: &Path) -> Result<Self> {
        for device in sysfs::card_device_dirs(root) {
            if sysfs::read_trimmed(&device.join("vendor")).as_deref() != Some(AMD_VENDOR_ID) {
                continue;
            }
            if !device.join("gpu_busy_percent").exists() {
                continue;
            }
            let hwmon = sysfs::find_hwmon(&device);
            return Ok(Self { device, hwmon, name: "AMD Radeon".to_string() });
        }
        Err(Error::unavailable("no amdgpu device under drm"))
    }
}

impl GpuSource for AmdGpu {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Amd
    }

    fn read_stats(&self) -> Result<GpuStats> {
        // A card vanishing mid-run (driver unload) reads as a failed query,
        // not a re-probe.
        let utilization = read_u64(&self.device.join("gpu_busy_percent"))
            .map(|percent| percent as f64)
            .ok_or_else(|| Error::source("amdgpu busy counter unreadable"))?;

        let mut stats = GpuStats {
            name: self.name.clone(),
            utilization_percent: Some(utilization),
            vram_used_bytes: read_u64(&self.device.join("mem_info_vram_used")),
            vram_total_bytes: read_u64(&self.device.join("mem_info_vram_total")),
            ..GpuStats::default()
        };

        if let Some(hwmon) = &self.hwmon {
            stats.temperature_c = read_u64(&hwmon.join("temp1_input")).map(|milli| milli as f64 / 1000.0);
            stats.power_watts = read_u64(&hwmon.join("power1_average"))
                .or_else(|| read_u64(&hwmon.join("power1_input")))
                .map(|micro| micro as f64 / 1_000_000.0);
            stats.fan_percent = fan_percent(hwmon);
            stats.core_clock_mhz = read_u64(&hwmon.join("freq1_input")).map(|hz| hz as f64 / 1_000_000.0);
        }
        Ok(stats)
    }
}

/// Fan duty from `pwm1` against its 0-255 scale.
fn fan_percent(hwmon: &Path) -> Option<f64> {
    let pwm = read_u64(&hwmon.join("pwm1"))? as f64;
    let max = read_u64(&hwmon.join("pwm1_max")).unwrap_or(255) as f64;
    if max > 0.0 {
        Some(pwm / max * 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    /// A throwaway sysfs lookalike under the system temp directory.
    struct FakeTree {
        root: PathBuf,
    }

    impl FakeTree {
        fn new(tag: &str) -> Self {
            let root = std::env::temp_dir().join(format!("host-metrics-amd-{tag}-{}", std::process::id()));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).unwrap();
            Self { root }
        }

        fn write(&self, rel: &str, contents: &str) {
            let path = self.root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
    }

    impl Drop for FakeTree {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    #[test]
    fn scan_finds_amd_card_and_reads_stats() {
        let tree = FakeTree::new("full");
        tree.write("card0/device/vendor", "0x1002\n");
        tree.write("card0/device/gpu_busy_percent", "37\n");
        tree.write("card0/device/mem_info_vram_used", "1073741824\n");
        tree.write("card0/device/mem_info_vram_total", "8589934592\n");
        tree.write("card0/device/hwmon/hwmon1/temp1_input", "64000\n");
        tree.write("card0/device/hwmon/hwmon1/power1_average", "130000000\n");
        tree.write("card0/device/hwmon/hwmon1/pwm1", "128\n");
        tree.write("card0/device/hwmon/hwmon1/pwm1_max", "255\n");
        tree.write("card0/device/hwmon/hwmon1/freq1_input", "1850000000\n");

        let gpu = AmdGpu::scan(&tree.root).unwrap();
        assert_eq!(gpu.vendor(), GpuVendor::Amd);

        let stats = gpu.read_stats().unwrap();
        assert_eq!(stats.utilization_percent, Some(37.0));
        assert_eq!(stats.vram_used_bytes, Some(1 << 30));
        assert_eq!(stats.vram_total_bytes, Some(8 << 30));
        assert_eq!(stats.temperature_c, Some(64.0));
        assert_eq!(stats.power_watts, Some(130.0));
        assert!((stats.fan_percent.unwrap() - 50.196).abs() < 0.01);
        assert_eq!(stats.core_clock_mhz, Some(1850.0));
    }

    #[test]
    fn scan_skips_non_amd_vendors() {
        let tree = FakeTree::new("foreign");
        tree.write("card0/device/vendor", "0x10de\n");
        tree.write("card0/device/gpu_busy_percent", "12\n");
        assert!(AmdGpu::scan(&tree.root).unwrap_err().is_unavailable());
    }

    #[test]
    fn scan_requires_the_busy_counter() {
        let tree = FakeTree::new("no-busy");
        tree.write("card0/device/vendor", "0x1002\n");
        assert!(AmdGpu::scan(&tree.root).unwrap_err().is_unavailable());
    }

    #[test]
    fn missing_hwmon_leaves_fields_absent() {
        let tree = FakeTree::new("no-hwmon");
        tree.write("card1/device/vendor", "0x1002\n");
        tree.write("card1/device/gpu_busy_percent", "5\n");

        let gpu = AmdGpu::scan(&tree.root).unwrap();
        let stats = gpu.read_stats().unwrap();
        assert_eq!(stats.utilization_percent, Some(5.0));
        assert_eq!(stats.vram_used_bytes, None);
        assert_eq!(stats.temperature_c, None);
        assert_eq!(stats.power_watts, None);
        assert_eq!(stats.fan_percent, None);
        assert_eq!(stats.core_clock_mhz, None);
    }
}
