//! # MemDB Protocol
//!
//! Line-oriented text protocol for MemDB.
//!
//! This crate provides:
//! - [`Command`] parsing of `SET`, `GET`, `UNSET`, `NUMEQUALTO`, `BEGIN`,
//!   `ROLLBACK`, `COMMIT` and `END`
//! - [`Session`] tracking the current transaction scope of one client
//! - [`Socket`] running a session over any buffered reader and writer
//!
//! Every command produces exactly one reply line; `END` and end of input
//! stop processing.
//!
//! ## Example
//!
//! ```rust
//! use memdb_core::Database;
//! use memdb_protocol::Socket;
//!
//! let mut socket = Socket::new(Database::new());
//! let mut out = Vec::new();
//! socket
//!     .process("SET a 10\nBEGIN\nSET a 20\nGET a\nROLLBACK\nGET a\nEND\n".as_bytes(), &mut out)
//!     .unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "\n\n\n20\n\n10\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod error;
mod session;
mod socket;

pub use command::Command;
pub use error::{ProtocolError, ProtocolResult};
pub use session::{Session, NO_TRANSACTION, NULL};
pub use socket::{ProcessSummary, Socket};
