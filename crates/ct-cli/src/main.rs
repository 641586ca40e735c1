use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{activities, log, report, session, stats};
use ct_cli::{Cli, Commands, Config, SessionAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ct_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ct_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        config,
        command,
    } = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout();

    match command {
        Some(Commands::Session { action }) => {
            let (db, _config) = open_database(config.as_deref())?;
            let state_path = ct_cli::state_file_path()?;
            match action {
                SessionAction::Start { project, timestamp } => {
                    let project = match project {
                        Some(project) => project,
                        None => std::env::current_dir()
                            .context("failed to determine current directory")?
                            .to_string_lossy()
                            .into_owned(),
                    };
                    session::start(&mut stdout, &db, &state_path, &project, timestamp)?;
                }
                SessionAction::End { timestamp } => {
                    session::end(&mut stdout, &db, &state_path, timestamp)?;
                }
                SessionAction::Current { project } => {
                    session::current(&mut stdout, &db, &state_path, project.as_deref())?;
                }
            }
        }
        Some(Commands::Log(args)) => {
            let (db, _config) = open_database(config.as_deref())?;
            let state_path = ct_cli::state_file_path()?;
            log::run(&mut stdout, &db, &state_path, args)?;
        }
        Some(Commands::Report(args)) => {
            let (db, loaded) = open_database(config.as_deref())?;
            report::run(&mut stdout, &db, &loaded, &args)?;
        }
        Some(Commands::Stats(args)) => {
            let (db, _config) = open_database(config.as_deref())?;
            stats::run(&mut stdout, &db, &args)?;
        }
        Some(Commands::Activities(args)) => {
            let (db, _config) = open_database(config.as_deref())?;
            activities::run(&mut stdout, &db, args)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
