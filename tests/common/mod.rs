//! Synthetic metric sources for driving a sampler without real hardware.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use host_metrics::prelude::*;
use parking_lot::Mutex;

/// Opt-in log output for debugging a test run: `RUST_LOG=host_metrics=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One scripted outcome of a source invocation.
#[derive(Debug, Clone)]
pub enum Step {
    Value(MetricValue),
    Fail,
    Unavailable,
}

/// A source that replays a script of outcomes, repeating the final step
/// forever once the script runs out. Invocations are counted.
pub struct ScriptedSource {
    category: MetricCategory,
    tier: CadenceTier,
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(category: MetricCategory, tier: CadenceTier, steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "a script needs at least one step");
        Self { category, tier, steps: Mutex::new(steps.into()), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricSource for ScriptedSource {
    fn category(&self) -> MetricCategory {
        self.category
    }

    fn tier(&self) -> CadenceTier {
        self.tier
    }

    async fn sample(&self) -> Result<MetricValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock();
            if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                steps.front().cloned().unwrap()
            }
        };
        match step {
            Step::Value(value) => Ok(value),
            Step::Fail => Err(Error::Source("scripted failure".into())),
            Step::Unavailable => Err(Error::Unavailable("scripted absence".into())),
        }
    }
}

/// A source that produces a strictly increasing process count, so every
/// invocation passes the change gate.
pub struct CountingSource {
    tier: CadenceTier,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(tier: CadenceTier) -> Self {
        Self { tier, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricSource for CountingSource {
    fn category(&self) -> MetricCategory {
        MetricCategory::ProcessCount
    }

    fn tier(&self) -> CadenceTier {
        self.tier
    }

    async fn sample(&self) -> Result<MetricValue> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MetricValue::ProcessCount(n as u64))
    }
}

/// A source whose every invocation takes `delay` before producing a value.
pub struct SlowSource {
    category: MetricCategory,
    tier: CadenceTier,
    delay: Duration,
    value: MetricValue,
    calls: AtomicUsize,
}

impl SlowSource {
    pub fn new(category: MetricCategory, tier: CadenceTier, delay: Duration, value: MetricValue) -> Self {
        Self { category, tier, delay, value, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricSource for SlowSource {
    fn category(&self) -> MetricCategory {
        self.category
    }

    fn tier(&self) -> CadenceTier {
        self.tier
    }

    async fn sample(&self) -> Result<MetricValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.value.clone())
    }
}

pub fn cpu_percent(percent: f64) -> MetricValue {
    MetricValue::Cpu(host_metrics::sample::CpuUsage { percent, cores: 8 })
}

/// A config with every tier shortened so tests finish quickly.
pub fn quick_config() -> SamplerConfig {
    let interval = Duration::from_millis(20);
    SamplerConfig {
        fast_interval: interval,
        medium_interval: interval,
        slow_interval: interval,
        ..SamplerConfig::default()
    }
}

/// Await the next sample, failing the test if nothing arrives in time.
pub async fn next_within(sampler: &mut Sampler, bound: Duration) -> MetricSample {
    tokio::time::timeout(bound, sampler.next_sample())
        .await
        .expect("timed out waiting for a sample")
        .expect("sample channel closed unexpectedly")
}

/// Assert that nothing arrives for `quiet`.
pub async fn expect_silence(sampler: &mut Sampler, quiet: Duration) {
    if let Ok(sample) = tokio::time::timeout(quiet, sampler.next_sample()).await {
        panic!("expected silence, got {sample:?}");
    }
}
