//! The capability every metric collector implements.
//!
//! Each [`MetricSource`] produces one category's reading and is statically
//! assigned one cadence tier. Implementations may fail or report themselves
//! unavailable; the sampler turns either into an invalid sample and keeps
//! going.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::sample::{CadenceTier, MetricCategory, MetricValue};
use crate::Result;

/// A polymorphic source producing one category of metric.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// The category this source produces.
    fn category(&self) -> MetricCategory;

    /// The cadence tier this source is polled on.
    fn tier(&self) -> CadenceTier;

    /// Fetch one reading. Errors mark the category invalid for this tick;
    /// [`Error::Unavailable`](crate::Error::Unavailable) marks it "N/A".
    async fn sample(&self) -> Result<MetricValue>;
}
