//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use st_core::Profile;

/// Screen and power session analyzer.
///
/// Reads macOS unified log entries, pairs lock/unlock (or wake/sleep) events
/// into sessions and aggregates them per day, with days starting at 5 a.m.
#[derive(Debug, Parser)]
#[command(name = "st", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where records come from and how they are classified.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Analysis profile: loginwindow, loginwindow-extended or powerchime.
    #[arg(short, long)]
    pub profile: Option<Profile>,

    /// Number of days of logs to read.
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Read `log show` JSON from a file instead of running it ("-" for stdin).
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Aggregate sessions per day and save the results.
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Daily CSV output path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Statistics JSON output path (defaults next to the CSV).
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Print only; do not write any files.
        #[arg(long)]
        no_write: bool,

        /// Print the full analysis as JSON instead of the summary table.
        #[arg(long)]
        json: bool,
    },

    /// Print classified events as JSONL.
    Events {
        #[command(flatten)]
        source: SourceArgs,

        /// Maximum number of events to print.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List paired sessions.
    Sessions {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show usage charts by day, hour, weekday and session length.
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of bins in the session length histogram.
        #[arg(long)]
        bins: Option<usize>,
    },

    /// Fetch raw log records and save them for offline analysis.
    Collect {
        /// Analysis profile whose log predicates are queried.
        #[arg(short, long)]
        profile: Option<Profile>,

        /// Number of days of logs to read.
        #[arg(short, long)]
        days: Option<u32>,

        /// Output path for the JSON records.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
