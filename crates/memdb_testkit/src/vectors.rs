//! Protocol test vectors.
//!
//! Each vector is a request transcript and the exact reply lines it must
//! produce, so other front ends can be checked against the same data.

use crate::fixtures::run_transcript;
use memdb_protocol::ProtocolResult;
use serde::{Deserialize, Serialize};

/// A request transcript with its expected replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Request lines, without terminators.
    pub input: Vec<String>,
    /// Expected reply lines, without terminators.
    pub expected: Vec<String>,
}

impl TranscriptVector {
    fn new(id: &str, description: &str, input: &[&str], expected: &[&str]) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: input.iter().map(|s| (*s).to_owned()).collect(),
            expected: expected.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Joins the request lines into protocol input.
    pub fn input_text(&self) -> String {
        let mut text = self.input.join("\n");
        text.push('\n');
        text
    }

    /// Runs the transcript on a fresh database and returns the reply lines.
    pub fn run(&self) -> ProtocolResult<Vec<String>> {
        let output = run_transcript(&self.input_text())?;
        Ok(output.lines().map(str::to_owned).collect())
    }
}

/// Transcripts covering every command and reply.
pub fn protocol_vectors() -> Vec<TranscriptVector> {
    vec![
        TranscriptVector::new(
            "basic",
            "Set, read, delete and read again; a blank line is unknown",
            &["", "SET ex 10", "GET ex", "UNSET ex", "GET ex", "END"],
            &["UNKNOWN COMMAND", "", "10", "", "NULL"],
        ),
        TranscriptVector::new(
            "num_equal_to",
            "Counts follow overwrites",
            &[
                "SET a 10",
                "SET b 10",
                "NUMEQUALTO 10",
                "NUMEQUALTO 20",
                "SET b 30",
                "NUMEQUALTO 10",
                "END",
            ],
            &["", "", "2", "0", "", "1"],
        ),
        TranscriptVector::new(
            "rollback_nested",
            "Each rollback undoes one block",
            &[
                "BEGIN", "SET a 10", "GET a", "BEGIN", "SET a 20", "GET a", "ROLLBACK", "GET a",
                "ROLLBACK", "GET a", "END",
            ],
            &["", "", "10", "", "", "20", "", "10", "", "NULL"],
        ),
        TranscriptVector::new(
            "commit_nested",
            "Commit closes every block; a later rollback has no transaction",
            &[
                "BEGIN", "SET a 30", "BEGIN", "SET a 40", "COMMIT", "GET a", "ROLLBACK", "END",
            ],
            &["", "", "", "", "", "40", "NO TRANSACTION"],
        ),
        TranscriptVector::new(
            "unset_rolled_back",
            "A delete in a rolled back block is forgotten",
            &[
                "SET a 50", "BEGIN", "GET a", "SET a 60", "BEGIN", "UNSET a", "GET a", "ROLLBACK",
                "GET a", "COMMIT", "GET a", "END",
            ],
            &["", "", "50", "", "", "", "NULL", "", "60", "", "60"],
        ),
        TranscriptVector::new(
            "num_equal_to_nested",
            "Counts inside nested blocks",
            &[
                "SET a 10",
                "BEGIN",
                "NUMEQUALTO 10",
                "BEGIN",
                "UNSET a",
                "NUMEQUALTO 10",
                "ROLLBACK",
                "NUMEQUALTO 10",
                "COMMIT",
                "END",
            ],
            &["", "", "1", "", "", "0", "", "1", ""],
        ),
        TranscriptVector::new(
            "no_transaction",
            "Commit and rollback outside a transaction",
            &["COMMIT", "ROLLBACK", "END"],
            &["NO TRANSACTION", "NO TRANSACTION"],
        ),
        TranscriptVector::new(
            "malformed",
            "Unknown keywords and missing arguments",
            &["get a", "GET", "SET a", "NUMEQUALTO", "UNSET", "END"],
            &[
                "UNKNOWN COMMAND",
                "INVALID ARGUMENTS",
                "INVALID ARGUMENTS",
                "INVALID ARGUMENTS",
                "INVALID ARGUMENTS",
            ],
        ),
        TranscriptVector::new(
            "value_with_spaces",
            "A value is the rest of the line",
            &["SET a hello world", "GET a", "NUMEQUALTO hello world", "END"],
            &["", "hello world", "1"],
        ),
        TranscriptVector::new(
            "end_of_input",
            "Input without END stops at end of input",
            &["SET a 1", "GET a"],
            &["", "1"],
        ),
    ]
}

/// Generates all test vectors as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn all_vectors_json() -> serde_json::Result<String> {
    let vectors = AllTestVectors {
        protocol: protocol_vectors(),
    };
    serde_json::to_string_pretty(&vectors)
}

/// Parses vectors produced by [`all_vectors_json`].
///
/// # Errors
///
/// Returns an error if `json` is not a vector set.
pub fn vectors_from_json(json: &str) -> serde_json::Result<Vec<TranscriptVector>> {
    let vectors: AllTestVectors = serde_json::from_str(json)?;
    Ok(vectors.protocol)
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    protocol: Vec<TranscriptVector>,
}
