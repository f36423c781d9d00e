//! Scheduler-wakeup edge source.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::SourceError;
use crate::source::{EdgeSource, EdgeWait, SourceInfo};

static CLOCK_EDGE_INFO: SourceInfo = SourceInfo {
    name: "clock_edge",
    description: "Scheduler wakeups timestamped on the monotonic clock",
    mechanism: "Requests a short sleep and treats the wakeup as an edge. The \
                wake time jitters with timer interrupt granularity, runqueue \
                length, thread priority decisions, and DVFS transitions, so \
                the nanosecond timestamps carry genuine scheduler noise.",
};

/// Turns OS scheduler wakeups into timing edges.
///
/// Each wait sleeps one pulse interval and reports the wake instant as an
/// edge on a monotonic nanosecond clock anchored at construction. Always
/// available; useful for exercising the full pipeline without hardware.
pub struct ClockEdgeSource {
    origin: Instant,
    pulse_interval: Duration,
}

impl ClockEdgeSource {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_micros(250))
    }

    pub fn with_interval(pulse_interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            pulse_interval,
        }
    }

    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

impl Default for ClockEdgeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeSource for ClockEdgeSource {
    fn info(&self) -> &SourceInfo {
        &CLOCK_EDGE_INFO
    }

    fn is_available(&self) -> bool {
        true
    }

    fn wait_next_edge(&mut self, timeout: Duration) -> Result<EdgeWait, SourceError> {
        if timeout < self.pulse_interval {
            thread::sleep(timeout);
            return Ok(EdgeWait::Timeout);
        }
        thread::sleep(self.pulse_interval);
        Ok(EdgeWait::Edge(self.now_ns()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_monotonic_timestamps() {
        let mut source = ClockEdgeSource::with_interval(Duration::from_micros(50));
        let mut last = 0u64;
        for _ in 0..16 {
            match source.wait_next_edge(Duration::from_secs(1)).unwrap() {
                EdgeWait::Edge(ts) => {
                    assert!(ts >= last);
                    last = ts;
                }
                EdgeWait::Timeout => panic!("unexpected timeout"),
            }
        }
        assert!(last > 0);
    }

    #[test]
    fn short_timeout_reports_timeout() {
        let mut source = ClockEdgeSource::with_interval(Duration::from_secs(10));
        let outcome = source.wait_next_edge(Duration::from_millis(1)).unwrap();
        assert_eq!(outcome, EdgeWait::Timeout);
    }

    #[test]
    fn info_is_populated() {
        let source = ClockEdgeSource::new();
        assert_eq!(source.name(), "clock_edge");
        assert!(source.is_available());
        assert!(!source.info().mechanism.is_empty());
    }
}
