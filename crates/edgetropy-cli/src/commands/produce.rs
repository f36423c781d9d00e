//! `edgetropy produce` — stream timing deltas from an edge source.

use std::io;
use std::time::Duration;

use edgetropy_core::{
    CancelToken, DatagramChannel, OutputFormat, RunContext, UdpChannel, run_producer,
    source_by_name, sources,
};

use super::resolve_destination;

pub fn run(source_name: &str, broadcast: Option<&str>, port: u16, json: bool, timeout_ms: u64) {
    let mut source = match source_by_name(source_name) {
        Some(source) => source,
        None => {
            eprintln!("Unknown source '{source_name}'. Registered sources:");
            for source in sources::available_sources() {
                eprintln!("  {}", source.name());
            }
            std::process::exit(1);
        }
    };
    if !source.is_available() {
        eprintln!("Source '{source_name}' is not available on this machine");
        std::process::exit(1);
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).expect("Error setting Ctrl+C handler");

    let mut channel = match broadcast {
        Some(host) => {
            let dest = match resolve_destination(host, port) {
                Ok(dest) => dest,
                Err(e) => {
                    eprintln!("Invalid broadcast destination '{host}': {e}");
                    std::process::exit(1);
                }
            };
            match UdpChannel::producer(dest) {
                Ok(channel) => {
                    log::info!("broadcasting to {dest}");
                    Some(channel)
                }
                Err(e) => {
                    eprintln!("Error opening datagram channel: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let ctx = RunContext {
        cancel,
        edge_timeout: Duration::from_millis(timeout_ms),
        format: if json {
            OutputFormat::Json
        } else {
            OutputFormat::Lines
        },
    };

    log::info!("producing from '{}', Ctrl+C to stop", source.name());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run_producer(
        &ctx,
        source.as_mut(),
        channel.as_mut().map(|c| c as &mut dyn DatagramChannel),
        &mut out,
    );

    match result {
        Ok(stats) => {
            eprintln!(
                "{} edges, {} deltas emitted, {} packets sent, {} send failures",
                stats.edges, stats.deltas_emitted, stats.packets_sent, stats.send_failures
            );
        }
        Err(e) => {
            eprintln!("Producer stopped: {e}");
            std::process::exit(1);
        }
    }
}
