//! CLI error types.

use std::{io, path::PathBuf};

use shastate_core::StateError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a named file (or stdin, shown as `-`) failed
    #[error("{}: {source}", .path.display())]
    Io {
        /// File the operation was on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A snapshot file was rejected by the digest handle
    #[error("{}: invalid snapshot: {source}", .path.display())]
    State {
        /// Snapshot file
        path: PathBuf,
        /// Why the snapshot was rejected
        #[source]
        source: StateError,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing results to the output stream failed
    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
