//! Error types for the text protocol.

use std::io;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while reading or running commands.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading from or writing to the stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The line does not start with a known command keyword.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// A known command is missing arguments.
    #[error("invalid arguments for {command}: expected {expected}, got {got}")]
    InvalidArguments {
        /// The command keyword.
        command: &'static str,
        /// Number of arguments the command takes.
        expected: usize,
        /// Number of arguments found on the line.
        got: usize,
    },
}

impl ProtocolError {
    /// Creates an invalid arguments error.
    pub fn invalid_arguments(command: &'static str, expected: usize, got: usize) -> Self {
        Self::InvalidArguments {
            command,
            expected,
            got,
        }
    }

    /// Returns the line written back to the client for a rejected command.
    ///
    /// Stream failures have no reply and end processing.
    #[must_use]
    pub fn reply(&self) -> Option<&'static str> {
        match self {
            Self::Io(_) => None,
            Self::UnknownCommand(_) => Some("UNKNOWN COMMAND"),
            Self::InvalidArguments { .. } => Some("INVALID ARGUMENTS"),
        }
    }
}
