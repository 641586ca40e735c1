//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Coding session tracker.
///
/// Records agent sessions and their activities, and reports estimated
/// active time per day and per project.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
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

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage tracked sessions.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Record an activity against the active session.
    Log(LogArgs),

    /// Generate an active-time report for a date range.
    Report(ReportArgs),

    /// Show recent session statistics.
    Stats(StatsArgs),

    /// Export flattened activity records as JSON.
    Activities(ActivitiesArgs),
}

/// Session lifecycle actions.
#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Start a new session, closing any dangling previous one.
    Start {
        /// Project directory the session belongs to. Defaults to the
        /// current working directory.
        #[arg(long)]
        project: Option<String>,

        /// Start timestamp (RFC 3339). Defaults to now.
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// End the active session.
    End {
        /// End timestamp (RFC 3339). Defaults to now.
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Show the active session, if any.
    Current {
        /// Look up the open session for a project instead of the
        /// locally stored one.
        #[arg(long)]
        project: Option<String>,
    },
}

/// Arguments for `ct log`.
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Session to log against. Defaults to the active session.
    #[arg(long)]
    pub session: Option<String>,

    /// Activity kind (message, assistant_response, tool_use, error, ...).
    #[arg(long, default_value = "tool_use")]
    pub kind: String,

    /// Activity timestamp (RFC 3339). Defaults to now.
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Metadata as inline JSON.
    #[arg(long)]
    pub metadata: Option<String>,

    /// Metadata as base64-encoded JSON, for shell-hostile payloads.
    #[arg(long, conflicts_with = "metadata")]
    pub metadata_base64: Option<String>,

    /// Tool payload as inline JSON.
    #[arg(long)]
    pub tool_detail: Option<String>,

    /// Tool payload as base64-encoded JSON.
    #[arg(long, conflicts_with = "tool_detail")]
    pub tool_detail_base64: Option<String>,
}

/// Arguments for `ct report`.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// First calendar date of the report, inclusive.
    pub start_date: NaiveDate,

    /// Last calendar date of the report, inclusive. Defaults to today.
    pub end_date: Option<NaiveDate>,

    /// Restrict the report to one project path.
    #[arg(long)]
    pub project: Option<String>,

    /// Output as JSON instead of the human-readable report.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `ct stats`.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Number of sessions to show.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Restrict to one project path.
    #[arg(long)]
    pub project: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `ct activities`.
#[derive(Debug, Args)]
pub struct ActivitiesArgs {
    /// Earliest activity calendar date, inclusive.
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Latest activity calendar date, inclusive.
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Restrict to one session.
    #[arg(long)]
    pub session: Option<String>,

    /// Restrict to one activity kind.
    #[arg(long)]
    pub kind: Option<String>,

    /// Restrict to one project path.
    #[arg(long)]
    pub project: Option<String>,

    /// Maximum number of records to consider.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Comma-separated dot-paths to keep in each record.
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Resume after this timestamp, from a previous page's `continue_after`.
    #[arg(long)]
    pub continue_after: Option<String>,

    /// Token budget for the page.
    #[arg(long)]
    pub token_limit: Option<usize>,
}
