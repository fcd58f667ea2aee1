//! Stream processing.

use crate::command::Command;
use crate::error::ProtocolResult;
use crate::session::Session;
use memdb_core::Scope;
use std::io::{BufRead, Write};
use tracing::{debug, trace};

/// Counters for one [`Socket::process`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Lines read, `END` included.
    pub lines: u64,
    /// Lines answered with `UNKNOWN COMMAND` or `INVALID ARGUMENTS`.
    pub rejected: u64,
    /// Whether processing stopped at an `END` command rather than at the
    /// end of input.
    pub ended: bool,
}

/// Reads commands from a stream and writes one reply line per command.
#[derive(Debug)]
pub struct Socket<S: Scope> {
    session: Session<S>,
}

impl<S: Scope> Socket<S> {
    /// Creates a socket whose session starts in `scope`.
    pub fn new(scope: S) -> Self {
        Self {
            session: Session::new(scope),
        }
    }

    /// Returns the session.
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Consumes the socket and returns the session.
    pub fn into_session(self) -> Session<S> {
        self.session
    }

    /// Processes lines until `END` or end of input.
    ///
    /// Each reply is flushed as soon as it is written. A final line without
    /// a terminator is still processed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Io`](crate::ProtocolError::Io) if reading,
    /// writing or flushing fails, including input that is not valid UTF-8.
    pub fn process<R: BufRead, W: Write>(
        &mut self,
        mut reader: R,
        mut writer: W,
    ) -> ProtocolResult<ProcessSummary> {
        let mut summary = ProcessSummary::default();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            summary.lines += 1;
            trace!(line = line.trim_end(), "request");

            let reply = match Command::parse(&line) {
                Ok(command) => match self.session.execute(&command) {
                    Some(reply) => reply,
                    None => {
                        summary.ended = true;
                        break;
                    }
                },
                Err(err) => match err.reply() {
                    Some(reply) => {
                        debug!(error = %err, "rejected line");
                        summary.rejected += 1;
                        reply.to_owned()
                    }
                    None => return Err(err),
                },
            };

            writeln!(writer, "{reply}")?;
            writer.flush()?;
        }

        debug!(
            lines = summary.lines,
            rejected = summary.rejected,
            ended = summary.ended,
            "input processed"
        );
        Ok(summary)
    }
}
