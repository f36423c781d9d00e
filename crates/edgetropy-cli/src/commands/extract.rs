//! `edgetropy extract` — turn a sample stream into packed random bytes.

use std::io::{self, Write};

use edgetropy_core::ExtractionMethod;

use super::read_extractor_samples;

pub fn run(method: &str, bit: u32, group_size: usize, max_samples: usize) {
    if group_size == 0 {
        eprintln!("Group size must be positive");
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let samples = match read_extractor_samples(stdin.lock(), max_samples) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Error reading samples: {e}");
            std::process::exit(1);
        }
    };

    if samples.is_empty() {
        eprintln!("No input samples read");
        std::process::exit(1);
    }

    let method = parse_method(method, bit, group_size);
    let bytes = method.extract(&samples);
    log::info!(
        "extracted {} bytes from {} samples using {method}",
        bytes.len(),
        samples.len()
    );

    // Raw binary on stdout; pipe it somewhere.
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if out.write_all(&bytes).and_then(|()| out.flush()).is_err() {
        std::process::exit(1);
    }
}

fn parse_method(name: &str, bit: u32, group_size: usize) -> ExtractionMethod {
    match name {
        "vonneumann" => ExtractionMethod::VonNeumann,
        "xorfold" => ExtractionMethod::XorFoldAdjacent,
        "xorgroup" => ExtractionMethod::XorGroup(group_size),
        "lsb" => ExtractionMethod::LsbExtract(bit),
        "interval" => ExtractionMethod::IntervalCompare,
        _ => {
            eprintln!("Unknown method '{name}', using interval");
            ExtractionMethod::IntervalCompare
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_variants() {
        assert_eq!(
            parse_method("interval", 0, 8),
            ExtractionMethod::IntervalCompare
        );
        assert_eq!(
            parse_method("vonneumann", 0, 8),
            ExtractionMethod::VonNeumann
        );
        assert_eq!(
            parse_method("xorfold", 0, 8),
            ExtractionMethod::XorFoldAdjacent
        );
        assert_eq!(parse_method("xorgroup", 0, 16), ExtractionMethod::XorGroup(16));
        assert_eq!(parse_method("lsb", 3, 8), ExtractionMethod::LsbExtract(3));
        assert_eq!(
            parse_method("bogus", 0, 8),
            ExtractionMethod::IntervalCompare
        );
    }
}
