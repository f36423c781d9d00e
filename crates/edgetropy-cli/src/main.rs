//! CLI for edgetropy — turn edge-timing jitter into random bits.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "edgetropy")]
#[command(about = "edgetropy — harvest randomness from edge-timing jitter")]
#[command(version = edgetropy_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read edge events and print timing deltas; optionally broadcast packets
    Produce {
        /// Edge source name (see `edgetropy sources`)
        #[arg(long, default_value = "clock_edge")]
        source: String,

        /// Send 20-byte timing packets to this host or host:port
        /// (e.g. 192.168.1.255, "[ff02::1]:8888")
        #[arg(long)]
        broadcast: Option<String>,

        /// UDP port used when --broadcast gives a bare host
        #[arg(long, default_value = "8888")]
        port: u16,

        /// Emit JSON lines instead of plain decimal deltas
        #[arg(long)]
        json: bool,

        /// Edge wait timeout in milliseconds (cancellation check interval)
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,
    },

    /// Receive timing packets and print their deltas
    Receive {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0:8888")]
        bind: String,

        /// Emit JSON lines instead of plain decimal deltas
        #[arg(long)]
        json: bool,

        /// Idle poll interval in milliseconds (cancellation check interval)
        #[arg(long, default_value = "1000")]
        poll_ms: u64,
    },

    /// Filter a timestamp stream: dead-time debounce and window reduction
    Filter {
        /// Dead time in nanoseconds (0 disables)
        #[arg(long, default_value = "0")]
        dead_time: u64,

        /// Window size in nanoseconds (0 disables)
        #[arg(long, default_value = "0")]
        window: u64,

        /// Window representative
        #[arg(long, default_value = "first", value_parser = ["first", "last", "mean"])]
        window_mode: String,

        /// Output form
        #[arg(long, default_value = "timestamps", value_parser = ["timestamps", "intervals"])]
        output: String,

        /// Maximum number of input samples to buffer
        #[arg(long, default_value = "10000000")]
        max_samples: usize,
    },

    /// Extract packed random bytes from a sample stream
    Extract {
        /// Extraction method
        #[arg(long, default_value = "interval",
              value_parser = ["interval", "vonneumann", "xorfold", "xorgroup", "lsb"])]
        method: String,

        /// Bit position for lsb extraction (0 = least significant)
        #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=63))]
        bit: u32,

        /// Group size for xorgroup extraction
        #[arg(long, default_value = "8")]
        group_size: usize,

        /// Maximum number of input samples to buffer
        #[arg(long, default_value = "10000000")]
        max_samples: usize,
    },

    /// List registered edge sources and their availability
    Sources,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Produce {
            source,
            broadcast,
            port,
            json,
            timeout_ms,
        } => commands::produce::run(&source, broadcast.as_deref(), port, json, timeout_ms),
        Commands::Receive { bind, json, poll_ms } => commands::receive::run(&bind, json, poll_ms),
        Commands::Filter {
            dead_time,
            window,
            window_mode,
            output,
            max_samples,
        } => commands::filter::run(dead_time, window, &window_mode, &output, max_samples),
        Commands::Extract {
            method,
            bit,
            group_size,
            max_samples,
        } => commands::extract::run(&method, bit, group_size, max_samples),
        Commands::Sources => commands::sources::run(),
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
