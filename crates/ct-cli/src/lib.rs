//! Coding session tracker CLI library.
//!
//! This crate provides the command-line interface for the session tracker.

mod cli;
pub mod commands;
mod config;
mod state;

pub use cli::{ActivitiesArgs, Cli, Commands, LogArgs, ReportArgs, SessionAction, StatsArgs};
pub use config::Config;
pub use state::state_file_path;
