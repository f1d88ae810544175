//! shastate command line tool.
//!
//! # Usage
//!
//! ```bash
//! # Digest files like sha256sum
//! shastate digest a.bin b.bin
//!
//! # Hash the first part of a stream and save the state
//! head -c 1G big.bin | shastate -a sha512 export -o part.state
//!
//! # Continue elsewhere and print the final digest
//! tail -c +1073741825 big.bin | shastate -a sha512 resume -s part.state
//! ```

use std::io;

use clap::Parser;
use shastate_cli::{CliConfig, Command};
use shastate_core::{AlgorithmId, io::DEFAULT_BUFFER_SIZE};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Resumable SHA-2 digests
#[derive(Parser, Debug)]
#[command(name = "shastate")]
#[command(about = "SHA-2 digests whose running state can be saved and resumed")]
#[command(version)]
struct Args {
    /// Digest algorithm (sha256, sha512)
    #[arg(short, long, global = true, default_value = "sha256")]
    algorithm: AlgorithmId,

    /// Read buffer size in bytes
    #[arg(long, global = true, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let config = CliConfig { algorithm: args.algorithm, read_buffer_size: args.buffer_size };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(error) = shastate_cli::run(&config, args.command, &mut out) {
        tracing::error!(%error, "command failed");
        return Err(error.into());
    }

    Ok(())
}
