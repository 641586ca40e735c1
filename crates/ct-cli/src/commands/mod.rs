//! CLI subcommand implementations.

pub mod activities;
pub mod log;
pub mod report;
pub mod session;
pub mod stats;
pub mod util;
