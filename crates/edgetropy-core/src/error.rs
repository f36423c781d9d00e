//! Error types for the pipeline, wire codec, sources, and transport.
//!
//! Every fallible operation in this crate returns one of these explicitly;
//! nothing in the library aborts the process. Timeouts are not errors: they
//! surface as [`EdgeWait::Timeout`](crate::source::EdgeWait) and
//! [`Recv::TimedOut`](crate::transport::Recv) on the wait results, and the
//! loops re-enter the wait.

use thiserror::Error;

/// Fatal errors for a filter/extract pipeline run.
///
/// Sample buffers are bounded by a caller-supplied maximum count; hitting the
/// bound or failing to grow the buffer ends the run with an error rather than
/// silently truncating the input.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller-supplied sample limit was reached before input ended.
    #[error("sample capacity exceeded: limit is {limit} samples")]
    CapacityExceeded { limit: usize },

    /// The sample buffer could not be grown.
    #[error("sample buffer allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),

    /// Reading the sample stream failed.
    #[error("sample input failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire-format errors for the fixed-size timing packet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Buffer length does not match the fixed wire size. The datagram is a
    /// framing error and gets dropped by the receive loop.
    #[error("invalid packet size: got {actual} bytes, expected {expected}")]
    InvalidSize { actual: usize, expected: usize },
}

/// Failure of an edge-event source. Fatal to the loop that was reading it.
#[derive(Debug, Error)]
#[error("edge source '{name}' failed: {reason}")]
pub struct SourceError {
    pub name: &'static str,
    pub reason: String,
}

/// Errors raised by the distribution loops.
///
/// Producer-side send failures are logged and do not end the loop; they are
/// counted in [`ProducerStats`](crate::transport::ProducerStats) instead.
/// Everything that reaches the caller through this type is fatal to the run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("datagram channel failed: {0}")]
    Channel(#[from] std::io::Error),

    #[error("output sink failed: {0}")]
    Sink(std::io::Error),
}
