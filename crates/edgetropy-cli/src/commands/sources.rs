//! `edgetropy sources` — list registered edge sources.

use edgetropy_core::sources::available_sources;

pub fn run() {
    for source in available_sources() {
        let info = source.info();
        let status = if source.is_available() {
            "available"
        } else {
            "unavailable"
        };
        println!("{:<12} {:<12} {}", info.name, status, info.description);
    }
}
