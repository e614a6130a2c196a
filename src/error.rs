//! Error handling for the host-metrics library.
//!
//! The taxonomy mirrors how sampling can go wrong at runtime:
//!
//! - [`Error::Unavailable`]: the backing API for a category is absent (for
//!   example, no GPU). Permanent for the process lifetime; the category is
//!   surfaced as "N/A" downstream.
//! - [`Error::Timeout`]: a single query exceeded its bound. Transient; the
//!   category is retried on its next natural tick, never immediately.
//! - [`Error::Source`]: a query failed unexpectedly. Treated like a timeout.
//!
//! None of these are fatal to the scheduler. The only fatal condition is a
//! failure to initialize core CPU/memory access at startup, which surfaces
//! as [`Error::System`] from `Collector::new`.

use std::time::Duration;

use thiserror::Error;

/// Error type for host-metrics operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed (sysfs reads, mostly).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing API for a metric category is absent.
    #[error("Metric source unavailable: {0}")]
    Unavailable(String),

    /// A single metric query exceeded its bounded timeout.
    #[error("Metric source timed out after {0:?}")]
    Timeout(Duration),

    /// A metric query failed in an unexpected way.
    #[error("Metric source failed: {0}")]
    Source(String),

    /// A failure outside the metric sources themselves.
    #[error("System error: {0}")]
    System(String),
}

impl Error {
    pub(crate) fn unavailable(msg: impl Into<String>) -> Self {
        Error::Unavailable(msg.into())
    }

    pub(crate) fn source(msg: impl Into<String>) -> Self {
        Error::Source(msg.into())
    }

    pub(crate) fn system(msg: impl Into<String>) -> Self {
        Error::System(msg.into())
    }

    /// True for the permanent "this category has no backing API" case.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }

    /// True for failures that are retried on the next natural tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Source(_) | Error::Io(_))
    }
}

/// Result type for host-metrics operations.
pub type Result<T> = std::result::Result<T, Error>;
