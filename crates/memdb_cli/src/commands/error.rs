//! CLI errors.

use memdb_protocol::ProtocolError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the `memdb` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be opened.
    #[error("cannot open input {path:?}: {source}")]
    Input {
        /// Path given on the command line.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Reading commands or writing replies failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The statistics report could not be serialized.
    #[error("stats serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported `--stats-format` value.
    #[error("unknown stats format: {0:?} (expected text or json)")]
    UnknownFormat(String),
}
