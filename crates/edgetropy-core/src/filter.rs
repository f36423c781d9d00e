//! Stream filtering for edge timestamps: dead-time debounce and fixed-width
//! time-window reduction.
//!
//! Both operations are pure functions over an ordered `u64` nanosecond
//! sequence. Input timestamps must be non-decreasing (the contract of every
//! [`EdgeSource`](crate::source::EdgeSource)); windowing additionally
//! requires ascending order because windows are scanned forward exactly once.

/// Representative chosen for each time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// First sample in the window.
    #[default]
    First,
    /// Last sample in the window.
    Last,
    /// Integer mean of all samples in the window (floor division).
    Mean,
}

impl std::fmt::Display for WindowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

/// Filter stages applied to a timestamp stream, in fixed order:
/// dead-time debounce first, then window reduction. A zero value disables
/// the corresponding stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterConfig {
    pub dead_time_ns: u64,
    pub window_size_ns: u64,
    pub window_mode: WindowMode,
}

impl FilterConfig {
    /// Apply the enabled stages to `samples`.
    pub fn apply(&self, samples: &[u64]) -> Vec<u64> {
        let debounced;
        let stage: &[u64] = if self.dead_time_ns > 0 {
            debounced = filter_dead_time(samples, self.dead_time_ns);
            &debounced
        } else {
            samples
        };

        if self.window_size_ns > 0 {
            apply_window(stage, self.window_size_ns, self.window_mode)
        } else {
            stage.to_vec()
        }
    }
}

/// Dead-time debounce: suppress events that follow the last *kept* event by
/// `dead_time_ns` or less.
///
/// The first sample is always kept. Output is a subsequence of the input,
/// and every consecutive kept pair is strictly more than `dead_time_ns`
/// apart. With `dead_time_ns == 0` only exact duplicates of the last kept
/// timestamp are dropped.
pub fn filter_dead_time(samples: &[u64], dead_time_ns: u64) -> Vec<u64> {
    let Some((&first, rest)) = samples.split_first() else {
        return Vec::new();
    };

    let mut filtered = Vec::with_capacity(samples.len());
    filtered.push(first);
    let mut last_kept = first;

    for &ts in rest {
        if ts.saturating_sub(last_kept) > dead_time_ns {
            filtered.push(ts);
            last_kept = ts;
        }
    }
    filtered
}

/// Reduce an ascending timestamp sequence to one representative per time
/// window of `window_size_ns`, anchored at multiples of the window size.
///
/// The first window's floor is `samples[0] / window_size_ns * window_size_ns`.
/// Scanning forward, a window closes when the next sample's floor moves past
/// it; input exhaustion closes the final window via a synthetic boundary one
/// window beyond the current floor. Windows are never split or merged, so the
/// output length equals the number of distinct window floors spanned.
///
/// Empty input or `window_size_ns == 0` yields an empty output.
pub fn apply_window(samples: &[u64], window_size_ns: u64, mode: WindowMode) -> Vec<u64> {
    if samples.is_empty() || window_size_ns == 0 {
        return Vec::new();
    }

    let mut reduced = Vec::new();
    let mut window_start = 0usize;
    let mut current_floor = samples[0] / window_size_ns * window_size_ns;

    for i in 1..=samples.len() {
        let next_floor = if i < samples.len() {
            samples[i] / window_size_ns * window_size_ns
        } else {
            current_floor + window_size_ns
        };

        if next_floor > current_floor {
            let window = &samples[window_start..i];
            reduced.push(match mode {
                WindowMode::First => window[0],
                WindowMode::Last => window[window.len() - 1],
                WindowMode::Mean => {
                    // Sum in u128: nanosecond timestamps overflow u64 in aggregate.
                    let sum: u128 = window.iter().map(|&ts| u128::from(ts)).sum();
                    (sum / window.len() as u128) as u64
                }
            });
            window_start = i;
            current_floor = next_floor;
        }
    }
    reduced
}

/// Inter-arrival intervals of a timestamp sequence: `samples[i] - samples[i-1]`.
pub fn to_intervals(samples: &[u64]) -> Vec<u64> {
    samples
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]))
        .collect()
}
