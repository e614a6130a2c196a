//! Top-level assembly of the standard source set.
//!
//! A [`Collector`] builds one source per metric category, resolves the GPU
//! vendor backend once, and hands everything to a
//! [`Sampler`](crate::sampler::Sampler). CPU and memory access are required
//! at construction; every other category degrades to invalid samples at
//! runtime instead of failing startup.
//!
//! # Example
//!
//! ```no_run
//! use host_metrics::collector::Collector;
//! use host_metrics::config::SamplerConfig;
//!
//! #[tokio::main]
//! async fn main() -> host_metrics::Result<()> {
//!     let collector = Collector::new(SamplerConfig::default())?;
//!     println!("gpu backend: {}", collector.gpu_vendor());
//!
//!     let mut sampler = collector.start();
//!     while let Some(sample) = sampler.next_sample().await {
//!         println!("{}: {:?}", sample.category, sample.value);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::SamplerConfig;
use crate::cpu::CpuSource;
use crate::disk::DiskSource;
use crate::gpu::{self, GpuMetricSource, GpuVendor};
use crate::memory::MemorySource;
use crate::network::NetworkSource;
use crate::process::ProcessCountSource;
use crate::sampler::Sampler;
use crate::source::MetricSource;
use crate::uptime::UptimeSource;
use crate::Result;

/// The standard set of metric sources, ready to start sampling.
pub struct Collector {
    config: SamplerConfig,
    sources: Vec<Arc<dyn MetricSource>>,
    gpu_vendor: GpuVendor,
}

impl Collector {
    /// Build one source per category and probe the GPU vendor chain once.
    ///
    /// Fails only when CPU or memory access cannot be initialized; that is
    /// the sole fatal startup condition.
    pub fn new(config: SamplerConfig) -> Result<Self> {
        let cpu = CpuSource::new()?;
        let memory = MemorySource::new()?;

        let gpu = GpuMetricSource::new(gpu::probe());
        let gpu_vendor = gpu.vendor();
        info!(vendor = %gpu_vendor, "gpu backend selected");

        let sources: Vec<Arc<dyn MetricSource>> = vec![
            Arc::new(cpu),
            Arc::new(memory),
            Arc::new(NetworkSource::new()),
            Arc::new(gpu),
            Arc::new(ProcessCountSource::new()),
            Arc::new(DiskSource::new()),
            Arc::new(UptimeSource::new()),
        ];
        Ok(Self { config, sources, gpu_vendor })
    }

    /// [`Collector::new`] with the default cadences and tolerances.
    pub fn with_defaults() -> Result<Self> {
        Self::new(SamplerConfig::default())
    }

    /// The GPU backend resolved at construction. Fixed for the process
    /// lifetime; a backend that stops responding later reports invalid
    /// samples rather than triggering a re-probe.
    pub fn gpu_vendor(&self) -> GpuVendor {
        self.gpu_vendor
    }

    /// Add a custom source alongside the built-in ones. It is polled on the
    /// tier it reports.
    pub fn register(&mut self, source: Arc<dyn MetricSource>) {
        self.sources.push(source);
    }

    /// Spawn the tier tasks and hand back the running sampler.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Sampler {
        Sampler::start(self.config, self.sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{CadenceTier, MetricCategory};

    #[test]
    fn collector_builds_all_seven_categories() {
        let collector = Collector::with_defaults().unwrap();
        let mut categories: Vec<MetricCategory> =
            collector.sources.iter().map(|source| source.category()).collect();
        categories.sort_by_key(|category| category.as_str());

        let mut expected: Vec<MetricCategory> = MetricCategory::ALL.to_vec();
        expected.sort_by_key(|category| category.as_str());
        assert_eq!(categories, expected);
    }

    #[test]
    fn built_in_sources_sit_on_their_default_tiers() {
        let collector = Collector::with_defaults().unwrap();
        for source in &collector.sources {
            assert_eq!(source.tier(), source.category().default_tier());
        }
    }

    #[test]
    fn vendor_is_stable_across_queries() {
        let collector = Collector::with_defaults().unwrap();
        let first = collector.gpu_vendor();
        assert_eq!(collector.gpu_vendor(), first);
    }

    #[tokio::test]
    async fn collector_starts_and_stops() {
        let config = SamplerConfig {
            fast_interval: std::time::Duration::from_millis(20),
            ..SamplerConfig::default()
        };

        let collector = Collector::new(config).unwrap();
        let mut sampler = collector.start();

        // The fast tier ticks immediately, so something arrives quickly.
        let sample = sampler.next_sample().await.unwrap();
        assert!(MetricCategory::ALL.contains(&sample.category));

        sampler.stop().await.unwrap();
    }

    #[test]
    fn register_appends_custom_sources() {
        use crate::sample::MetricValue;
        use async_trait::async_trait;

        struct ConstantUptime;

        #[async_trait]
        impl crate::source::MetricSource for ConstantUptime {
            fn category(&self) -> MetricCategory {
                MetricCategory::Uptime
            }

            fn tier(&self) -> CadenceTier {
                CadenceTier::Slow
            }

            async fn sample(&self) -> Result<MetricValue> {
                Ok(MetricValue::Uptime(1))
            }
        }

        let mut collector = Collector::with_defaults().unwrap();
        let before = collector.sources.len();
        collector.register(Arc::new(ConstantUptime));
        assert_eq!(collector.sources.len(), before + 1);
    }
}
