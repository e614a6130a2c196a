//! Change-driven forwarding.
//!
//! The gate sits between the sampler's tier loops and the outbound channel.
//! Per category it keeps the last published value and validity, and forwards
//! a fresh sample only when it tells the consumer something new:
//!
//! - the first sample of a category always passes,
//! - integer counts pass on any change, float fields on a move of at least
//!   the category's tolerance,
//! - a failure passes once when a previously healthy category goes invalid;
//!   repeat failures are suppressed until it recovers,
//! - recovery itself always passes, even when the value matches the one
//!   published before the outage.
//!
//! State is mutated only when a sample is forwarded, so suppressed jitter
//! cannot drift the comparison baseline.

use std::collections::HashMap;

use crate::config::Tolerances;
use crate::sample::{MetricCategory, MetricSample, MetricValue};

/// What the gate remembers about one category.
#[derive(Debug, Default)]
struct CategoryState {
    /// Last published value. Survives invalid stretches; an invalid sample
    /// carries nothing to overwrite it with.
    value: Option<MetricValue>,
    valid: bool,
}

/// Per-category change suppression over a stream of [`MetricSample`]s.
#[derive(Debug, Default)]
pub struct ChangeGate {
    tolerances: Tolerances,
    states: HashMap<MetricCategory, CategoryState>,
}

impl ChangeGate {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances, states: HashMap::new() }
    }

    /// Decide whether `sample` is worth forwarding. Returns the sample back
    /// when it is; suppressed samples are dropped here.
    pub fn evaluate(&mut self, sample: MetricSample) -> Option<MetricSample> {
        let tolerance = self.tolerances.for_category(sample.category);
        let forward = match self.states.get(&sample.category) {
            None => true,
            Some(state) => match &sample.value {
                // Invalid: report the transition, swallow repeats.
                None => state.valid,
                Some(value) => {
                    !state.valid
                        || state.value.as_ref().is_none_or(|previous| value.differs_from(previous, tolerance))
                },
            },
        };
        if !forward {
            return None;
        }

        let state = self.states.entry(sample.category).or_default();
        state.valid = sample.is_valid();
        if let Some(value) = &sample.value {
            state.value = Some(value.clone());
        }
        Some(sample)
    }

    /// The last value published for `category`, if any sample of it has been
    /// forwarded with one.
    pub fn last_published(&self, category: MetricCategory) -> Option<&MetricValue> {
        self.states.get(&category).and_then(|state| state.value.as_ref())
    }

    /// Forget all per-category state. The next sample of every category is
    /// forwarded unconditionally.
    pub fn reset(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{CpuUsage, Validity};

    fn cpu(percent: f64) -> MetricSample {
        MetricSample::valid(MetricValue::Cpu(CpuUsage { percent, cores: 8 }))
    }

    fn processes(count: u64) -> MetricSample {
        MetricSample::valid(MetricValue::ProcessCount(count))
    }

    fn cpu_failed() -> MetricSample {
        MetricSample::invalid(MetricCategory::Cpu, Validity::Failed)
    }

    fn gate() -> ChangeGate {
        ChangeGate::new(Tolerances::default())
    }

    #[test]
    fn first_sample_always_forwards() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(0.0)).is_some());
    }

    #[test]
    fn within_tolerance_suppressed_beyond_forwarded() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(42.0)).is_some());
        assert!(gate.evaluate(cpu(42.05)).is_none());
        assert!(gate.evaluate(cpu(43.0)).is_some());
    }

    #[test]
    fn suppression_does_not_drift_the_baseline() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(42.0)).is_some());
        // Each step is under the tolerance against 42.0, the last published.
        assert!(gate.evaluate(cpu(42.05)).is_none());
        assert!(gate.evaluate(cpu(42.09)).is_none());
        assert!(gate.evaluate(cpu(42.11)).is_some());
    }

    #[test]
    fn counts_forward_on_any_change() {
        let mut gate = gate();
        assert!(gate.evaluate(processes(120)).is_some());
        assert!(gate.evaluate(processes(120)).is_none());
        assert!(gate.evaluate(processes(121)).is_some());
    }

    #[test]
    fn invalid_forwarded_once_per_transition() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(42.0)).is_some());
        assert!(gate.evaluate(cpu_failed()).is_some());
        assert!(gate.evaluate(cpu_failed()).is_none());
        assert!(gate.evaluate(cpu_failed()).is_none());
    }

    #[test]
    fn recovery_forwards_even_if_value_is_unchanged() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(42.0)).is_some());
        assert!(gate.evaluate(cpu_failed()).is_some());
        assert!(gate.evaluate(cpu(42.0)).is_some());
        // Back to steady state: jitter is suppressed again.
        assert!(gate.evaluate(cpu(42.01)).is_none());
    }

    #[test]
    fn invalid_transition_keeps_the_published_value() {
        let mut gate = gate();
        gate.evaluate(cpu(42.0));
        gate.evaluate(cpu_failed());
        assert_eq!(
            gate.last_published(MetricCategory::Cpu),
            Some(&MetricValue::Cpu(CpuUsage { percent: 42.0, cores: 8 }))
        );
    }

    #[test]
    fn first_invalid_sample_forwards_without_caching_a_value() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu_failed()).is_some());
        assert_eq!(gate.last_published(MetricCategory::Cpu), None);
        // The first real value after startup failure passes.
        assert!(gate.evaluate(cpu(3.0)).is_some());
    }

    #[test]
    fn categories_are_tracked_independently() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(42.0)).is_some());
        assert!(gate.evaluate(processes(120)).is_some());
        assert!(gate.evaluate(cpu(42.0)).is_none());
        assert!(gate.evaluate(processes(120)).is_none());
    }

    #[test]
    fn reset_republishes_everything() {
        let mut gate = gate();
        assert!(gate.evaluate(cpu(42.0)).is_some());
        assert!(gate.evaluate(cpu(42.0)).is_none());
        gate.reset();
        assert!(gate.evaluate(cpu(42.0)).is_some());
    }
}
