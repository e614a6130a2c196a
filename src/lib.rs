//! Host Metrics - A Rust library for multi-rate host telemetry sampling
//!
//! This crate polls a fixed set of host metric categories on independent
//! cadence tiers, pushes every reading through a change gate, and delivers
//! only the samples worth reporting over a bounded async channel. It is the
//! data-collection core of a monitoring dashboard: the sampling policy,
//! change suppression and failure semantics live here, the presentation does
//! not.
//!
//! # Features
//!
//! - **CPU Metrics**: overall utilization and logical core count
//! - **Memory Metrics**: physical memory usage in percent and bytes
//! - **Disk Metrics**: aggregate space usage across real disks
//! - **Network Metrics**: per-second throughput derived from interface counters
//! - **GPU Metrics**: utilization, VRAM, temperature, power, fan and clock
//!   via an NVIDIA / AMD / generic backend probed once at startup
//! - **Process Count**: number of running processes
//! - **Uptime**: seconds since boot
//!
//! Categories are polled on three tiers (1 s, 5 s and 30 s by default) so a
//! slow query never delays a fast one. A failing category yields invalid
//! samples and keeps its slot; the only fatal startup error is being unable
//! to read CPU or memory at all.
//!
//! # Examples
//!
//! ```no_run
//! use host_metrics::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut sampler = Collector::with_defaults()?.start();
//!
//!     while let Some(sample) = sampler.next_sample().await {
//!         match sample.value {
//!             Some(value) => println!("{} = {:?}", sample.category, value),
//!             None => println!("{} is {:?}", sample.category, sample.validity),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The sampler also implements [`futures::Stream`], so the usual combinators
//! apply.
//!
//! # Error Handling
//!
//! The crate uses one [`Error`] type across all sources. At runtime the
//! interesting distinction is permanent versus transient:
//!
//! ```
//! use host_metrics::{Error, Result};
//!
//! fn classify(result: Result<()>) -> &'static str {
//!     match result {
//!         Ok(()) => "ok",
//!         Err(err) if err.is_unavailable() => "category reports N/A from now on",
//!         Err(err) if err.is_transient() => "category retries on its next tick",
//!         Err(_) => "fatal",
//!     }
//! }
//! ```
//!
//! # Thread Safety
//!
//! Sources are `Send + Sync` and owned by the sampler's Tokio tasks. The
//! change gate is the only shared mutable state and sits behind a mutex that
//! is never held across an await point. Dropping a [`Sampler`] aborts its
//! tasks; [`Sampler::stop`](sampler::Sampler::stop) shuts them down cleanly
//! first.

#![doc(html_root_url = "https://docs.rs/host-metrics/0.1.0")]

pub mod collector;
pub mod config;
pub mod cpu;
pub mod disk;
pub mod error;
pub mod gate;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod process;
pub mod sample;
pub mod sampler;
pub mod source;
pub mod uptime;

pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::collector::Collector;
    pub use crate::config::{SamplerConfig, Tolerances};
    pub use crate::gpu::{GpuStats, GpuVendor};
    pub use crate::sample::{CadenceTier, MetricCategory, MetricSample, MetricValue, Validity};
    pub use crate::sampler::Sampler;
    pub use crate::source::MetricSource;
    pub use crate::{Error, Result};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn prelude_exposes_the_working_set() {
        let config = SamplerConfig::default();
        assert_eq!(config.tolerances.cpu, 0.1);
        assert_eq!(MetricCategory::Gpu.default_tier(), CadenceTier::Fast);
    }

    #[tokio::test]
    async fn end_to_end_smoke() -> Result<()> {
        let mut sampler = Collector::with_defaults()?.start();
        let sample = sampler.next_sample().await;
        assert!(sample.is_some());
        sampler.stop().await
    }
}
