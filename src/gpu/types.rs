//! GPU data types shared by every vendor backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::float_differs;

/// The vendor backend selected at startup. Resolved once via probing and
/// fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    /// OS performance counters, vendor-agnostic: usage and VRAM only.
    Generic,
    /// No usable GPU path; queries always report unavailable.
    Disabled,
}

impl GpuVendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            GpuVendor::Nvidia => "nvidia",
            GpuVendor::Amd => "amd",
            GpuVendor::Generic => "generic",
            GpuVendor::Disabled => "disabled",
        }
    }
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One GPU reading. Every numeric field is optional: a vendor path that
/// cannot measure something reports `None`, never zero, so sinks can tell
/// "0%" from "not measured".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuStats {
    /// Sanitized marketing name ("Nvidia GeForce RTX 3080").
    pub name: String,
    pub utilization_percent: Option<f64>,
    pub vram_used_bytes: Option<u64>,
    pub vram_total_bytes: Option<u64>,
    pub temperature_c: Option<f64>,
    pub power_watts: Option<f64>,
    pub fan_percent: Option<f64>,
    pub core_clock_mhz: Option<f64>,
}

impl GpuStats {
    /// Field-wise change rule. Float fields use the epsilon comparison; a
    /// field appearing or disappearing counts as a change, as does a name
    /// change. VRAM compares at MiB granularity so per-byte allocator churn
    /// does not defeat the gate.
    pub(crate) fn differs_from(&self, previous: &GpuStats, tolerance: f64) -> bool {
        self.name != previous.name
            || opt_float_differs(self.utilization_percent, previous.utilization_percent, tolerance)
            || vram_differs(self.vram_used_bytes, previous.vram_used_bytes)
            || vram_differs(self.vram_total_bytes, previous.vram_total_bytes)
            || opt_float_differs(self.temperature_c, previous.temperature_c, tolerance)
            || opt_float_differs(self.power_watts, previous.power_watts, tolerance)
            || opt_float_differs(self.fan_percent, previous.fan_percent, tolerance)
            || opt_float_differs(self.core_clock_mhz, previous.core_clock_mhz, tolerance)
    }
}

fn opt_float_differs(a: Option<f64>, b: Option<f64>, tolerance: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => float_differs(a, b, tolerance),
        (None, None) => false,
        _ => true,
    }
}

fn vram_differs(a: Option<u64>, b: Option<u64>) -> bool {
    let mib = |bytes: Option<u64>| bytes.map(|b| b >> 20);
    mib(a) != mib(b)
}

/// Strip trademark noise from a GPU marketing name and collapse whitespace.
///
/// `"NVIDIA GeForce RTX(TM) 3080 Graphics"` becomes
/// `"Nvidia GeForce RTX 3080"`.
pub(crate) fn sanitize_model_name(raw: &str) -> String {
    const NOISE: &[&str] = &["(TM)", "(R)", "(C)", "\u{2122}", "\u{AE}", "\u{A9}", "Corporation", "Graphics", "Series"];

    let mut name = raw.to_string();
    for noise in NOISE {
        name = name.replace(noise, "");
    }
    name = name.replace("NVIDIA", "Nvidia");
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
