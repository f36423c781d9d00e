//! `edgetropy filter` — debounce and window-reduce a timestamp stream.

use std::io::{self, BufWriter, Write};

use edgetropy_core::{FilterConfig, to_intervals};

use super::{parse_window_mode, read_samples};

pub fn run(dead_time: u64, window: u64, window_mode: &str, output: &str, max_samples: usize) {
    let stdin = io::stdin();
    let samples = match read_samples(stdin.lock(), max_samples) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Error reading samples: {e}");
            std::process::exit(1);
        }
    };

    let config = FilterConfig {
        dead_time_ns: dead_time,
        window_size_ns: window,
        window_mode: parse_window_mode(window_mode),
    };
    let filtered = config.apply(&samples);
    log::info!(
        "filtered {} samples down to {} (dead_time={dead_time} ns, window={window} ns)",
        samples.len(),
        filtered.len()
    );

    let values = if output == "intervals" {
        to_intervals(&filtered)
    } else {
        filtered
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for value in values {
        if writeln!(out, "{value}").is_err() {
            break; // Broken pipe
        }
    }
    let _ = out.flush();
}
