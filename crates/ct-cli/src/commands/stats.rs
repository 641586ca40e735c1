//! Stats command listing recent sessions.

use std::io::Write;

use anyhow::Result;
use ct_db::{Database, Session};

use crate::cli::StatsArgs;
use crate::commands::util::format_minutes;

/// Runs the stats command.
pub fn run<W: Write>(out: &mut W, db: &Database, args: &StatsArgs) -> Result<()> {
    let sessions = db.recent_sessions(args.limit, args.project.as_deref())?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&sessions)?)?;
        return Ok(());
    }

    if sessions.is_empty() {
        writeln!(out, "No sessions recorded.")?;
        return Ok(());
    }

    writeln!(out, "RECENT SESSIONS")?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<10}{:<22}{:<22}{:>9}  {:>5}  {:>5}",
        "ID", "PROJECT", "STARTED", "DURATION", "MSGS", "TOOLS"
    )?;
    for session in &sessions {
        writeln!(out, "{}", format_row(session))?;
    }
    Ok(())
}

fn format_row(session: &Session) -> String {
    let id_short = &session.id[..8.min(session.id.len())];
    let duration = session
        .duration_minutes
        .map_or_else(|| "open".to_string(), format_minutes);
    format!(
        "{id_short:<10}{:<22}{:<22}{duration:>9}  {:>5}  {:>5}",
        session.project_name, session.start_time, session.message_count, session.tool_use_count
    )
}
