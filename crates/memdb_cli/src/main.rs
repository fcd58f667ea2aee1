//! MemDB CLI
//!
//! Runs the MemDB text protocol over stdin and stdout.
//!
//! # Usage
//!
//! ```text
//! memdb                      # read commands from stdin
//! memdb --input cmds.txt     # read commands from a file
//! memdb --stats --stats-format json
//! ```

mod commands;

use clap::Parser;
use memdb_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// In-memory key-value database with nested transactions.
#[derive(Parser)]
#[command(name = "memdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print database statistics to stderr on exit
    #[arg(long)]
    stats: bool,

    /// Statistics output format (text, json)
    #[arg(long, default_value = "text")]
    stats_format: String,

    /// Keep every history link instead of compacting in-transaction rewrites
    #[arg(long)]
    no_compact_history: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries protocol replies only
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = commands::stats::Format::parse(&cli.stats_format)?;
    let config = Config::new()
        .compact_history(!cli.no_compact_history)
        .collect_stats(cli.stats);

    let outcome = commands::serve::run(cli.input.as_deref(), config)?;

    if cli.stats {
        let report = commands::stats::StatsReport::new(&outcome);
        commands::stats::print(&report, format)?;
    }

    Ok(())
}
