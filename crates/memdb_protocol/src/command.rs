//! Command parsing.

use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;
use std::str::FromStr;

/// One parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET name value`; the value is the rest of the line.
    Set {
        /// Key to write.
        name: String,
        /// Value to store.
        value: String,
    },
    /// `GET name`.
    Get {
        /// Key to read.
        name: String,
    },
    /// `UNSET name`.
    Unset {
        /// Key to delete.
        name: String,
    },
    /// `NUMEQUALTO value`; the value is the rest of the line.
    NumEqualTo {
        /// Value to count.
        value: String,
    },
    /// `BEGIN`.
    Begin,
    /// `ROLLBACK`.
    Rollback,
    /// `COMMIT`.
    Commit,
    /// `END`.
    End,
}

impl Command {
    /// Parses a single line.
    ///
    /// Surrounding spaces and line terminators are ignored. Keywords are
    /// case-sensitive. Arguments after the last one a command takes are
    /// ignored.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::UnknownCommand`] for unknown keywords and blank
    ///   lines
    /// - [`ProtocolError::InvalidArguments`] if arguments are missing
    pub fn parse(line: &str) -> ProtocolResult<Self> {
        let line = trim_line(line);
        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, Some(rest)),
            None => (line, None),
        };

        match keyword {
            "SET" => {
                let (name, value) = rest
                    .and_then(|rest| rest.split_once(' '))
                    .ok_or_else(|| ProtocolError::invalid_arguments("SET", 2, arity(rest)))?;
                Ok(Self::Set {
                    name: name.to_owned(),
                    value: value.to_owned(),
                })
            }
            "GET" => Ok(Self::Get {
                name: first_arg("GET", rest)?,
            }),
            "UNSET" => Ok(Self::Unset {
                name: first_arg("UNSET", rest)?,
            }),
            "NUMEQUALTO" => {
                let value = rest
                    .ok_or_else(|| ProtocolError::invalid_arguments("NUMEQUALTO", 1, 0))?;
                Ok(Self::NumEqualTo {
                    value: value.to_owned(),
                })
            }
            "BEGIN" => Ok(Self::Begin),
            "ROLLBACK" => Ok(Self::Rollback),
            "COMMIT" => Ok(Self::Commit),
            "END" => Ok(Self::End),
            _ => Err(ProtocolError::UnknownCommand(keyword.to_owned())),
        }
    }

    /// Returns the command keyword.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Set { .. } => "SET",
            Self::Get { .. } => "GET",
            Self::Unset { .. } => "UNSET",
            Self::NumEqualTo { .. } => "NUMEQUALTO",
            Self::Begin => "BEGIN",
            Self::Rollback => "ROLLBACK",
            Self::Commit => "COMMIT",
            Self::End => "END",
        }
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the command in wire form, without a line terminator.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { name, value } => write!(f, "SET {name} {value}"),
            Self::Get { name } => write!(f, "GET {name}"),
            Self::Unset { name } => write!(f, "UNSET {name}"),
            Self::NumEqualTo { value } => write!(f, "NUMEQUALTO {value}"),
            other => f.write_str(other.keyword()),
        }
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_matches(|c| matches!(c, ' ' | '\n' | '\r'))
}

fn first_arg(command: &'static str, rest: Option<&str>) -> ProtocolResult<String> {
    rest.map(|rest| rest.split(' ').next().unwrap_or(rest).to_owned())
        .ok_or_else(|| ProtocolError::invalid_arguments(command, 1, 0))
}

fn arity(rest: Option<&str>) -> usize {
    rest.map_or(0, |rest| rest.splitn(2, ' ').count())
}
