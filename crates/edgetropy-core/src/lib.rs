//! # edgetropy-core
//!
//! **Randomness lives in the edges.**
//!
//! `edgetropy-core` turns jitter in hardware edge-timing events — GPIO
//! transitions, pulse detectors, anything that can timestamp a physical
//! transition in nanoseconds — into usable random bits.
//!
//! ## Quick Start
//!
//! ```
//! use edgetropy_core::{ExtractionMethod, FilterConfig, WindowMode};
//!
//! // Timestamps from an edge source (nanoseconds, non-decreasing)
//! let timestamps = [5u64, 50, 110, 180, 205, 340, 377, 901];
//!
//! // Debounce and reduce to one event per 100 ns window
//! let config = FilterConfig {
//!     dead_time_ns: 10,
//!     window_size_ns: 100,
//!     window_mode: WindowMode::First,
//! };
//! let filtered = config.apply(&timestamps);
//!
//! // Pack the inter-arrival comparisons into a debiased bitstream
//! let intervals = edgetropy_core::to_intervals(&filtered);
//! let bits = ExtractionMethod::IntervalCompare.extract(&intervals);
//! assert!(bits.len() <= intervals.len());
//! ```
//!
//! ## Architecture
//!
//! Edge source → StreamFilter → EntropyExtractor → bytes
//!
//! or, across machines:
//!
//! Edge source → PacketCodec → DistributionTransport → network → consumer
//!
//! Every edge source implements the [`EdgeSource`] trait, so the pipeline
//! runs unchanged against real hardware, the built-in software sources, or a
//! scripted sequence in tests. The wire format is a fixed 20-byte big-endian
//! packet ([`TimingPacket`]); the transport is any [`DatagramChannel`], with
//! a UDP implementation included.
//!
//! Output is raw, debiased timing entropy. No hashing, no whitening — what
//! the hardware jitters is what you get.

pub mod error;
pub mod extract;
pub mod filter;
pub mod packet;
pub mod source;
pub mod sources;
pub mod transport;

pub use error::{PacketError, PipelineError, SourceError, TransportError};
pub use extract::{
    BitPacker, ExtractionMethod, interval_compare, lsb_extract, von_neumann, xor_fold_adjacent,
    xor_group,
};
pub use filter::{FilterConfig, WindowMode, apply_window, filter_dead_time, to_intervals};
pub use packet::{TimingPacket, WIRE_SIZE};
pub use source::{EdgeSource, EdgeWait, SourceInfo};
pub use sources::{ClockEdgeSource, SyntheticEdgeSource, available_sources, source_by_name};
pub use transport::{
    CancelToken, DatagramChannel, OutputFormat, ProducerStats, Recv, ReceiverStats, RunContext,
    UdpChannel, run_producer, run_receiver,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
