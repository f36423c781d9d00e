//! `edgetropy receive` — print deltas from incoming timing packets.

use std::io;
use std::time::Duration;

use edgetropy_core::{CancelToken, OutputFormat, RunContext, UdpChannel, run_receiver};

use super::resolve_destination;

pub fn run(bind: &str, json: bool, poll_ms: u64) {
    let bind_addr = match resolve_destination(bind, 8888) {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid bind address '{bind}': {e}");
            std::process::exit(1);
        }
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).expect("Error setting Ctrl+C handler");

    let mut channel =
        match UdpChannel::receiver(bind_addr, Some(Duration::from_millis(poll_ms))) {
            Ok(channel) => channel,
            Err(e) => {
                eprintln!("Error binding {bind_addr}: {e}");
                std::process::exit(1);
            }
        };

    match channel.local_addr() {
        Ok(addr) => log::info!("listening on {addr}, Ctrl+C to stop"),
        Err(_) => log::info!("listening on {bind_addr}, Ctrl+C to stop"),
    }

    let ctx = RunContext {
        cancel,
        edge_timeout: Duration::from_millis(poll_ms),
        format: if json {
            OutputFormat::Json
        } else {
            OutputFormat::Lines
        },
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_receiver(&ctx, &mut channel, &mut out) {
        Ok(stats) => {
            eprintln!("{} packets received, {} dropped", stats.packets, stats.dropped);
        }
        Err(e) => {
            eprintln!("Receiver stopped: {e}");
            std::process::exit(1);
        }
    }
}
