//! Tiered periodic sampling.
//!
//! The sampler owns one Tokio task per cadence tier. Each task ticks on its
//! own interval, queries the tier's sources in a fixed order, routes every
//! outcome through the [`ChangeGate`](crate::gate::ChangeGate) and forwards
//! surviving samples into a bounded channel consumed via
//! [`Sampler::next_sample`] or the [`futures::Stream`] adapter.
//!
//! # Scheduling guarantees
//!
//! - Tiers are independent: a slow-tier query stuck in the OS never delays
//!   the fast tier.
//! - Missed ticks are skipped, not replayed; after a stall a task resumes on
//!   its next scheduled tick.
//! - Every source invocation is bounded by [`SOURCE_TIMEOUT`]. A timeout
//!   yields an invalid sample for that category and the loop moves on.
//! - Samples of one category arrive in sampling order. Nothing is guaranteed
//!   across categories on different tiers.
//! - [`Sampler::stop`] lets in-flight queries finish, bounded by
//!   [`STOP_TIMEOUT`]; tasks still running at the deadline are aborted.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::SamplerConfig;
use crate::error::Error;
use crate::gate::ChangeGate;
use crate::sample::{CadenceTier, MetricSample, MetricValue, Validity};
use crate::source::MetricSource;
use crate::Result;

/// Upper bound on a single source invocation.
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound on waiting for tier tasks to finish during [`Sampler::stop`].
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);
/// Depth of the outbound sample channel.
pub const SAMPLE_CHANNEL_CAPACITY: usize = 32;

/// A running set of tier tasks and the channel their samples arrive on.
///
/// Constructed by [`Sampler::start`] (or
/// [`Collector::start`](crate::collector::Collector::start)); consumed either
/// by awaiting [`next_sample`](Sampler::next_sample) or by using the sampler
/// as a [`Stream`]. Dropping the sampler aborts the tasks; calling
/// [`stop`](Sampler::stop) first shuts them down cleanly.
#[derive(Debug)]
pub struct Sampler {
    sample_rx: mpsc::Receiver<MetricSample>,
    stop_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
    gate: Arc<Mutex<ChangeGate>>,
}

impl Sampler {
    /// Spawn one sampling task per tier that has at least one source.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: SamplerConfig, sources: Vec<Arc<dyn MetricSource>>) -> Self {
        let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = watch::channel(false);
        let gate = Arc::new(Mutex::new(ChangeGate::new(config.tolerances.clone())));

        let mut handles = Vec::new();
        for tier in CadenceTier::ALL {
            let tier_sources: Vec<Arc<dyn MetricSource>> =
                sources.iter().filter(|source| source.tier() == tier).cloned().collect();
            if tier_sources.is_empty() {
                continue;
            }
            handles.push(tokio::spawn(tier_loop(
                tier,
                config.interval_for(tier),
                tier_sources,
                Arc::clone(&gate),
                sample_tx.clone(),
                stop_rx.clone(),
            )));
        }
        // Tier tasks hold the only senders now; the channel closes once the
        // last task exits.
        drop(sample_tx);

        Self { sample_rx, stop_tx, handles, gate }
    }

    /// Await the next forwarded sample. Returns `None` once every tier task
    /// has exited and the channel drained.
    pub async fn next_sample(&mut self) -> Option<MetricSample> {
        self.sample_rx.recv().await
    }

    /// Drop all change-gate state so the next sample of every category is
    /// forwarded even if unchanged.
    pub fn force_refresh(&self) {
        self.gate.lock().reset();
    }

    /// Signal the tier tasks to stop and wait for them to finish.
    ///
    /// In-flight source queries are allowed to complete (they are themselves
    /// bounded by [`SOURCE_TIMEOUT`]); the total wait is bounded by
    /// [`STOP_TIMEOUT`], after which stragglers are aborted and an error is
    /// returned. Calling `stop` again is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if self.handles.is_empty() {
            return Ok(());
        }
        // A send error means every task already exited.
        let _ = self.stop_tx.send(true);

        let deadline = Instant::now() + STOP_TIMEOUT;
        let mut unclean = 0usize;
        for mut handle in self.handles.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, &mut handle).await {
                Ok(Ok(())) => {},
                Ok(Err(join_err)) => {
                    warn!(error = %join_err, "tier task ended abnormally");
                    unclean += 1;
                },
                Err(_) => {
                    handle.abort();
                    warn!("tier task missed the stop deadline and was aborted");
                    unclean += 1;
                },
            }
        }
        if unclean == 0 {
            Ok(())
        } else {
            Err(Error::system(format!("{unclean} sampling task(s) did not stop cleanly")))
        }
    }
}

impl Stream for Sampler {
    type Item = MetricSample;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().sample_rx.poll_recv(cx)
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        // Can't await in Drop; flip the stop flag and cut the tasks loose.
        let _ = self.stop_tx.send(true);
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// One tier's sampling loop: tick, query each source, gate, forward.
async fn tier_loop(
    tier: CadenceTier,
    period: Duration,
    sources: Vec<Arc<dyn MetricSource>>,
    gate: Arc<Mutex<ChangeGate>>,
    sample_tx: mpsc::Sender<MetricSample>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(%tier, ?period, sources = sources.len(), "tier task started");

    'run: loop {
        tokio::select! {
            // Also fires when the sampler is dropped and the sender goes away.
            _ = stop_rx.changed() => break 'run,
            _ = ticker.tick() => {},
        }
        for source in &sources {
            if *stop_rx.borrow() {
                break 'run;
            }
            let sample = invoke_source(source.as_ref(), SOURCE_TIMEOUT).await;
            let forwarded = gate.lock().evaluate(sample);
            if let Some(sample) = forwarded {
                if sample_tx.send(sample).await.is_err() {
                    debug!(%tier, "sample channel closed, tier task exiting");
                    break 'run;
                }
            }
        }
    }
    debug!(%tier, "tier task stopped");
}

/// Run one source query under `bound`, mapping an elapsed deadline into
/// [`Error::Timeout`].
pub(crate) async fn query_source(source: &dyn MetricSource, bound: Duration) -> Result<MetricValue> {
    match tokio::time::timeout(bound, source.sample()).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(bound)),
    }
}

/// Run one source query and normalize the outcome into a sample. Errors
/// become invalid samples: permanent unavailability maps to
/// [`Validity::Unavailable`], everything else to [`Validity::Failed`].
pub(crate) async fn invoke_source(source: &dyn MetricSource, bound: Duration) -> MetricSample {
    match query_source(source, bound).await {
        Ok(value) => MetricSample::valid(value),
        Err(err) => {
            let validity =
                if err.is_unavailable() { Validity::Unavailable } else { Validity::Failed };
            if matches!(err, Error::Timeout(_)) {
                warn!(category = %source.category(), error = %err, "source query timed out");
            } else {
                debug!(category = %source.category(), error = %err, "source query failed");
            }
            MetricSample::invalid(source.category(), validity)
        },
    }
}
