//! Scripted and randomized edge source for tests and dry runs.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::error::SourceError;
use crate::source::{EdgeSource, EdgeWait, SourceInfo};
use crate::transport::CancelToken;

static SYNTHETIC_INFO: SourceInfo = SourceInfo {
    name: "synthetic",
    description: "Scripted or pseudo-random edge timestamps, no hardware",
    mechanism: "Replays a caller-supplied timestamp sequence, or generates \
                pseudo-random inter-arrival intervals around a base rate. \
                Carries no physical entropy; exists so pipelines and \
                transports can be exercised deterministically.",
};

enum Script {
    /// Replay exact timestamps, then report timeouts.
    Fixed(VecDeque<u64>),
    /// Endless stream of randomized intervals, paced in real time.
    Jittered {
        next_ns: u64,
        base_interval_ns: u64,
        jitter_ns: u64,
    },
}

/// Edge source driven by a script instead of hardware.
///
/// The fixed form replays a timestamp sequence one edge per wait and reports
/// [`EdgeWait::Timeout`] once exhausted; pair it with
/// [`cancel_when_exhausted`](Self::cancel_when_exhausted) to wind down a
/// transport loop deterministically. The jittered form never runs out.
pub struct SyntheticEdgeSource {
    script: Script,
    on_exhausted: Option<CancelToken>,
}

impl SyntheticEdgeSource {
    /// Replay the given timestamps in order.
    pub fn from_timestamps<I: IntoIterator<Item = u64>>(timestamps: I) -> Self {
        Self {
            script: Script::Fixed(timestamps.into_iter().collect()),
            on_exhausted: None,
        }
    }

    /// Endless pseudo-random edges: each interval is `base_interval_ns` plus
    /// a uniform jitter in `0..=jitter_ns`, and each wait sleeps one base
    /// interval so output paces like a real pulse line.
    pub fn jittered(base_interval_ns: u64, jitter_ns: u64) -> Self {
        Self {
            script: Script::Jittered {
                next_ns: 0,
                base_interval_ns,
                jitter_ns,
            },
            on_exhausted: None,
        }
    }

    /// The jittered source as registered under the name `synthetic`:
    /// roughly a thousand edges per second.
    pub fn default_jittered() -> Self {
        Self::jittered(1_000_000, 250_000)
    }

    /// Cancel `token` when the fixed script runs out of timestamps.
    pub fn cancel_when_exhausted(mut self, token: CancelToken) -> Self {
        self.on_exhausted = Some(token);
        self
    }

    /// Timestamps remaining in a fixed script (0 for jittered sources).
    pub fn remaining(&self) -> usize {
        match &self.script {
            Script::Fixed(queue) => queue.len(),
            Script::Jittered { .. } => 0,
        }
    }
}

impl EdgeSource for SyntheticEdgeSource {
    fn info(&self) -> &SourceInfo {
        &SYNTHETIC_INFO
    }

    fn is_available(&self) -> bool {
        true
    }

    fn wait_next_edge(&mut self, timeout: Duration) -> Result<EdgeWait, SourceError> {
        match &mut self.script {
            Script::Fixed(queue) => match queue.pop_front() {
                Some(ts) => Ok(EdgeWait::Edge(ts)),
                None => {
                    if let Some(token) = &self.on_exhausted {
                        token.cancel();
                    }
                    Ok(EdgeWait::Timeout)
                }
            },
            Script::Jittered {
                next_ns,
                base_interval_ns,
                jitter_ns,
            } => {
                let pace = Duration::from_nanos(*base_interval_ns);
                if timeout < pace {
                    thread::sleep(timeout);
                    return Ok(EdgeWait::Timeout);
                }
                thread::sleep(pace);
                let interval = *base_interval_ns + rand::rng().random_range(0..=*jitter_ns);
                *next_ns += interval;
                Ok(EdgeWait::Edge(*next_ns))
            }
        }
    }
}
