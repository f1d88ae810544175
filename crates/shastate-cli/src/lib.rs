//! Command line front end for `shastate-core`.
//!
//! The binary parses arguments into a [`CliConfig`] and a [`Command`] and
//! hands both to [`run`], which writes results to any `Write`. Tests drive
//! [`run`] directly with an in-memory buffer.
//!
//! Inputs named `-` (or no input at all) are read from stdin.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;

use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use clap::Subcommand;
pub use error::CliError;
use shastate_core::{
    Algorithm, AlgorithmId, AnyDigest, Hmac, Sha256Algorithm, Sha512Algorithm, StatefulDigest,
    io::{DEFAULT_BUFFER_SIZE, absorb_reader_with_buffer},
};
use zeroize::Zeroizing;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Digest algorithm
    pub algorithm: AlgorithmId,
    /// Read buffer size in bytes
    pub read_buffer_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { algorithm: AlgorithmId::Sha256, read_buffer_size: DEFAULT_BUFFER_SIZE }
    }
}

impl CliConfig {
    /// Upper bound on the read buffer.
    pub const MAX_READ_BUFFER_SIZE: usize = 64 * 1024 * 1024;

    /// Checks that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the read buffer size is zero or larger
    /// than [`Self::MAX_READ_BUFFER_SIZE`].
    pub fn validate(&self) -> Result<(), CliError> {
        if self.read_buffer_size == 0 || self.read_buffer_size > Self::MAX_READ_BUFFER_SIZE {
            return Err(CliError::Config(format!(
                "read buffer size must be between 1 and {} bytes, got {}",
                Self::MAX_READ_BUFFER_SIZE,
                self.read_buffer_size
            )));
        }
        Ok(())
    }
}

/// A command to run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the digest of each input
    Digest {
        /// Input files (stdin if none or "-")
        inputs: Vec<PathBuf>,
    },

    /// Hash an input and save the running state instead of finishing
    Export {
        /// Input file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Where to write the snapshot
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Continue from a saved state
    Resume {
        /// Snapshot written by `export` or `resume -o`
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Input file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Write a new snapshot here instead of printing the digest
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the HMAC of an input
    Hmac {
        /// File holding the raw key bytes
        #[arg(short, long)]
        key: PathBuf,

        /// Input file (stdin if omitted or "-")
        input: Option<PathBuf>,
    },
}

/// Runs `command`, writing results to `out`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a file can't be read or
/// written, a snapshot is rejected, or writing to `out` fails.
pub fn run<W: Write>(config: &CliConfig, command: Command, out: &mut W) -> Result<(), CliError> {
    config.validate()?;

    match command {
        Command::Digest { inputs } => {
            let inputs = if inputs.is_empty() { vec![PathBuf::from("-")] } else { inputs };
            for input in &inputs {
                let mut digest = AnyDigest::new(config.algorithm);
                absorb(config, &mut digest, input)?;
                writeln!(out, "{}  {}", hex::encode(digest.finish()), input.display())?;
            }
        },

        Command::Export { input, output } => {
            let input = input_or_stdin(input);
            let mut digest = AnyDigest::new(config.algorithm);
            absorb(config, &mut digest, &input)?;
            save_snapshot(&digest, &output)?;
        },

        Command::Resume { snapshot, input, output } => {
            let input = input_or_stdin(input);
            let mut digest = load_snapshot(config.algorithm, &snapshot)?;
            absorb(config, &mut digest, &input)?;

            match output {
                Some(output) => save_snapshot(&digest, &output)?,
                None => writeln!(out, "{}  {}", hex::encode(digest.finish()), input.display())?,
            }
        },

        Command::Hmac { key, input } => {
            let input = input_or_stdin(input);
            let key_bytes = Zeroizing::new(fs::read(&key).map_err(|e| CliError::io(&key, e))?);
            let mac = match config.algorithm {
                AlgorithmId::Sha256 => mac::<Sha256Algorithm>(config, &key_bytes, &input)?,
                AlgorithmId::Sha512 => mac::<Sha512Algorithm>(config, &key_bytes, &input)?,
            };
            writeln!(out, "{}  {}", hex::encode(mac), input.display())?;
        },
    }

    out.flush()?;
    Ok(())
}

fn input_or_stdin(input: Option<PathBuf>) -> PathBuf {
    input.unwrap_or_else(|| PathBuf::from("-"))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn absorb<D: StatefulDigest>(
    config: &CliConfig,
    digest: &mut D,
    input: &Path,
) -> Result<(), CliError> {
    let result = if is_stdin(input) {
        absorb_reader_with_buffer(digest, io::stdin().lock(), config.read_buffer_size)
    } else {
        let file = File::open(input).map_err(|e| CliError::io(input, e))?;
        absorb_reader_with_buffer(digest, file, config.read_buffer_size)
    };
    let read = result.map_err(|e| CliError::io(input, e))?;

    tracing::debug!(input = %input.display(), bytes = read, "absorbed input");
    Ok(())
}

fn mac<A: Algorithm>(config: &CliConfig, key: &[u8], input: &Path) -> Result<Vec<u8>, CliError> {
    let mut mac = Hmac::<A>::new(key);
    absorb(config, &mut mac, input)?;
    Ok(mac.finish().as_ref().to_vec())
}

fn save_snapshot<D: StatefulDigest>(digest: &D, path: &Path) -> Result<(), CliError> {
    let snapshot = digest.export_state();
    fs::write(path, snapshot.as_bytes()).map_err(|e| CliError::io(path, e))?;

    tracing::info!(
        snapshot = %path.display(),
        bytes_processed = digest.bytes_processed(),
        "saved digest state"
    );
    Ok(())
}

fn load_snapshot(algorithm: AlgorithmId, path: &Path) -> Result<AnyDigest, CliError> {
    let mut bytes = Zeroizing::new(Vec::with_capacity(algorithm.state_size() + 1));
    // One byte past the expected size is enough for import to reject an
    // oversized file.
    File::open(path)
        .and_then(|file| file.take(algorithm.state_size() as u64 + 1).read_to_end(&mut bytes))
        .map_err(|e| CliError::io(path, e))?;

    let mut digest = AnyDigest::new(algorithm);
    digest
        .import_state(&bytes)
        .map_err(|source| CliError::State { path: path.to_path_buf(), source })?;

    tracing::info!(
        snapshot = %path.display(),
        bytes_processed = digest.bytes_processed(),
        "resumed digest state"
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CliConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let config = CliConfig { read_buffer_size: 0, ..CliConfig::default() };
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        let mut out = Vec::new();
        let result = run(&config, Command::Digest { inputs: vec![] }, &mut out);
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn stdin_marker() {
        assert!(is_stdin(Path::new("-")));
        assert!(!is_stdin(Path::new("./-")));
        assert_eq!(input_or_stdin(None), PathBuf::from("-"));
    }
}
