//! Protocol loop over stdin or a file.

use super::error::CliError;
use memdb_core::{Config, Database, StatsSnapshot};
use memdb_protocol::{ProcessSummary, Socket};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::info;

/// What a protocol run left behind.
#[derive(Debug)]
pub struct RunOutcome {
    /// Line counters from the socket.
    pub summary: ProcessSummary,
    /// Database counters at exit.
    pub stats: StatsSnapshot,
    /// Transaction blocks still open when input stopped.
    pub open_transactions: usize,
}

/// Runs the protocol from `input` (stdin if `None`) to stdout.
pub fn run(input: Option<&Path>, config: Config) -> Result<RunOutcome, CliError> {
    let stdout = io::stdout();
    match input {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Input {
                path: path.to_path_buf(),
                source,
            })?;
            serve(BufReader::new(file), stdout.lock(), config)
        }
        None => serve(io::stdin().lock(), stdout.lock(), config),
    }
}

/// Runs the protocol on a fresh database.
pub fn serve<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    config: Config,
) -> Result<RunOutcome, CliError> {
    let mut socket = Socket::new(Database::with_config(config));
    let summary = socket.process(reader, writer)?;
    let scope = socket.into_session().into_scope();

    if !scope.is_root() {
        info!(depth = scope.depth(), "input stopped inside open transactions");
    }

    Ok(RunOutcome {
        summary,
        stats: scope.stats().snapshot(),
        open_transactions: scope.depth(),
    })
}
