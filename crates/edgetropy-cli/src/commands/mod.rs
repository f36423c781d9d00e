pub mod extract;
pub mod filter;
pub mod produce;
pub mod receive;
pub mod sources;

use std::io::BufRead;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use edgetropy_core::{PipelineError, WindowMode};

/// Read one unsigned decimal sample per line, bounded by `max_samples`.
///
/// Blank lines are skipped; unparseable lines are logged and skipped so a
/// stray header or trailing garbage doesn't poison the run. Exceeding the
/// bound is an error, not a truncation.
pub fn read_samples<R: BufRead>(reader: R, max_samples: usize) -> Result<Vec<u64>, PipelineError> {
    let mut samples: Vec<u64> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<u64>() {
            Ok(value) => push_bounded(&mut samples, value, max_samples)?,
            Err(_) => log::warn!("skipping unparseable sample line: {trimmed:?}"),
        }
    }
    Ok(samples)
}

/// Sample intake for the extractor, preserving the historical framing rule:
/// a line is parsed by its leading decimal digits, and a parsed value of
/// zero only counts when the raw line itself begins with '0'. Anything else
/// that parses to zero (garbage, negatives) is dropped silently.
pub fn read_extractor_samples<R: BufRead>(
    reader: R,
    max_samples: usize,
) -> Result<Vec<u64>, PipelineError> {
    let mut samples: Vec<u64> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let value = parse_leading_u64(line.trim_start());
        if value > 0 || line.starts_with('0') {
            push_bounded(&mut samples, value, max_samples)?;
        }
    }
    Ok(samples)
}

/// strtoull-style parse: consume leading ASCII digits, saturating on
/// overflow; no digits parse as 0.
fn parse_leading_u64(s: &str) -> u64 {
    let mut value: u64 = 0;
    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        value = value
            .saturating_mul(10)
            .saturating_add(u64::from(byte - b'0'));
    }
    value
}

fn push_bounded(samples: &mut Vec<u64>, value: u64, limit: usize) -> Result<(), PipelineError> {
    if samples.len() >= limit {
        return Err(PipelineError::CapacityExceeded { limit });
    }
    if samples.len() == samples.capacity() {
        let additional = samples.capacity().max(64).min(limit - samples.len());
        samples.try_reserve(additional)?;
    }
    samples.push(value);
    Ok(())
}

/// Parse a window mode string into the enum.
pub fn parse_window_mode(s: &str) -> WindowMode {
    match s {
        "last" => WindowMode::Last,
        "mean" => WindowMode::Mean,
        "first" => WindowMode::First,
        _ => {
            eprintln!("Unknown window mode '{s}', using first");
            WindowMode::First
        }
    }
}

/// Resolve a destination given as `IP`, `host`, `IP:port`, `[v6]:port`, or
/// `host:port`; `default_port` fills in when the port is absent.
pub fn resolve_destination(host: &str, default_port: u16) -> std::io::Result<SocketAddr> {
    if let Ok(addr) = host.parse::<SocketAddr>() {
        return Ok(addr);
    }
    // Bare IP literal, including unbracketed IPv6.
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }
    let candidate = if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{default_port}")
    };
    candidate
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved"))
}
