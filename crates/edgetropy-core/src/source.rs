//! Abstract edge-event source.
//!
//! Every source of timing edges implements the [`EdgeSource`] trait: metadata
//! via [`SourceInfo`], availability checking, and a blocking wait for the
//! next transition. Hardware sources (GPIO lines, pulse detectors) live
//! outside this crate and plug in through the same trait; the built-in
//! sources under [`sources`](crate::sources) are software stand-ins.

use std::time::Duration;

use crate::error::SourceError;

/// Metadata about an edge-event source.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique identifier (e.g. `"clock_edge"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    /// Explanation of where the timing jitter comes from.
    pub mechanism: &'static str,
}

/// Outcome of waiting for the next edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWait {
    /// A transition was observed at the given nanosecond timestamp.
    ///
    /// Timestamps from one source are monotonically non-decreasing.
    Edge(u64),
    /// No transition arrived within the timeout. Not an error: the caller
    /// checks for cancellation and re-enters the wait.
    Timeout,
}

/// Trait that every edge-event source must implement.
pub trait EdgeSource {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Check if this source can operate on the current machine.
    fn is_available(&self) -> bool;

    /// Block until the next edge or until `timeout` elapses.
    ///
    /// The timeout bounds how long a caller goes without a cancellation
    /// check; it is not required to be precise.
    fn wait_next_edge(&mut self, timeout: Duration) -> Result<EdgeWait, SourceError>;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
