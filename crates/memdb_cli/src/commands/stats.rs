//! Statistics report printed on exit.

use super::error::CliError;
use super::serve::RunOutcome;
use serde::Serialize;

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// Parses a `--stats-format` value.
    pub fn parse(value: &str) -> Result<Self, CliError> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_owned())),
        }
    }
}

/// Statistics for one run.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    /// Core library version.
    pub version: &'static str,
    /// Protocol counters.
    pub session: SessionStats,
    /// Database counters.
    pub database: OperationStats,
}

/// Protocol counters.
#[derive(Debug, Serialize)]
pub struct SessionStats {
    /// Lines read.
    pub lines: u64,
    /// Lines rejected as unknown or malformed.
    pub rejected: u64,
    /// Whether input stopped at `END`.
    pub ended: bool,
    /// Transaction blocks still open at exit.
    pub open_transactions: usize,
}

/// Database counters.
#[derive(Debug, Serialize)]
pub struct OperationStats {
    /// `GET` calls.
    pub reads: u64,
    /// `SET` calls.
    pub writes: u64,
    /// `UNSET` calls.
    pub deletes: u64,
    /// `NUMEQUALTO` calls.
    pub count_queries: u64,
    /// Transactions started.
    pub transactions_started: u64,
    /// Successful `COMMIT`s.
    pub transactions_committed: u64,
    /// Layers merged into their parent by those commits.
    pub layers_merged: u64,
    /// Transactions rolled back.
    pub transactions_rolled_back: u64,
    /// Commits refused by a conflict.
    pub conflicts: u64,
}

impl StatsReport {
    /// Builds the report for a finished run.
    pub fn new(outcome: &RunOutcome) -> Self {
        let stats = &outcome.stats;
        Self {
            version: memdb_core::VERSION,
            session: SessionStats {
                lines: outcome.summary.lines,
                rejected: outcome.summary.rejected,
                ended: outcome.summary.ended,
                open_transactions: outcome.open_transactions,
            },
            database: OperationStats {
                reads: stats.reads,
                writes: stats.writes,
                deletes: stats.deletes,
                count_queries: stats.count_queries,
                transactions_started: stats.transactions_started,
                transactions_committed: stats.transactions_committed,
                layers_merged: stats.layers_merged,
                transactions_rolled_back: stats.transactions_rolled_back,
                conflicts: stats.conflicts,
            },
        }
    }
}

/// Renders the report.
pub fn render(report: &StatsReport, format: Format) -> Result<String, CliError> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(report)?),
        Format::Text => Ok(render_text(report)),
    }
}

/// Prints the report to stderr.
pub fn print(report: &StatsReport, format: Format) -> Result<(), CliError> {
    eprintln!("{}", render(report, format)?);
    Ok(())
}

fn render_text(report: &StatsReport) -> String {
    let s = &report.session;
    let db = &report.database;
    let mut out = String::new();
    out.push_str(&format!("MemDB v{} Statistics\n", report.version));
    out.push_str("====================\n\n");
    out.push_str("Session:\n");
    out.push_str(&format!("  Lines read:        {}\n", s.lines));
    out.push_str(&format!("  Rejected:          {}\n", s.rejected));
    out.push_str(&format!("  Stopped at END:    {}\n", s.ended));
    out.push_str(&format!("  Open transactions: {}\n\n", s.open_transactions));
    out.push_str("Operations:\n");
    out.push_str(&format!("  Reads:         {}\n", db.reads));
    out.push_str(&format!("  Writes:        {}\n", db.writes));
    out.push_str(&format!("  Deletes:       {}\n", db.deletes));
    out.push_str(&format!("  Count queries: {}\n\n", db.count_queries));
    out.push_str("Transactions:\n");
    out.push_str(&format!("  Started:       {}\n", db.transactions_started));
    out.push_str(&format!("  Committed:     {}\n", db.transactions_committed));
    out.push_str(&format!("  Layers merged: {}\n", db.layers_merged));
    out.push_str(&format!("  Rolled back:   {}\n", db.transactions_rolled_back));
    out.push_str(&format!("  Conflicts:     {}", db.conflicts));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::serve::serve;
    use memdb_core::Config;
    use std::io::Cursor;

    fn report_for(input: &str) -> StatsReport {
        let outcome = serve(Cursor::new(input), Vec::new(), Config::default()).unwrap();
        StatsReport::new(&outcome)
    }

    #[test]
    fn parse_format() {
        assert_eq!(Format::parse("text").unwrap(), Format::Text);
        assert_eq!(Format::parse("json").unwrap(), Format::Json);
        assert!(matches!(
            Format::parse("yaml"),
            Err(CliError::UnknownFormat(_))
        ));
    }

    #[test]
    fn json_report() {
        let report = report_for("SET a 1\nBEGIN\nUNSET a\nCOMMIT\nGET a\nEND\n");
        let json = render(&report, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["session"]["lines"], 6);
        assert_eq!(value["session"]["ended"], true);
        assert_eq!(value["database"]["writes"], 1);
        assert_eq!(value["database"]["deletes"], 1);
        assert_eq!(value["database"]["transactions_committed"], 1);
        assert_eq!(value["database"]["layers_merged"], 1);
    }

    #[test]
    fn nested_commit_counts_once() {
        let report = report_for("BEGIN
SET a 1
BEGIN
SET a 2
BEGIN
COMMIT
END
");
        assert_eq!(report.database.transactions_committed, 1);
        assert_eq!(report.database.layers_merged, 3);

        let text = render(&report, Format::Text).unwrap();
        assert!(text.contains("Committed:     1"));
        assert!(text.contains("Layers merged: 3"));
    }

    #[test]
    fn text_report() {
        let report = report_for("BOGUS\nBEGIN\nROLLBACK\n");
        let text = render(&report, Format::Text).unwrap();

        assert!(text.contains("Rejected:          1"));
        assert!(text.contains("Rolled back:   1"));
        assert!(text.contains("Stopped at END:    false"));
    }
}
