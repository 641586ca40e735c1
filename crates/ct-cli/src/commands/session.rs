//! Session lifecycle commands.
//!
//! `start` and `end` are wired to agent hooks, so they run in separate
//! short-lived processes and coordinate through the current-session file.
//! A crashed agent never calls `end`; the next `start` closes the dangling
//! session at its own start timestamp so the old session can't accrue time
//! forever.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ct_db::{Database, DbError, Session};

use crate::commands::util::{format_minutes, now_timestamp};
use crate::state;

/// Starts a new session and marks it active.
///
/// Prints the new session id on its own line so hook scripts can capture it.
pub fn start<W: Write>(
    out: &mut W,
    db: &Database,
    state_path: &Path,
    project: &str,
    timestamp: Option<String>,
) -> Result<()> {
    let timestamp = timestamp.unwrap_or_else(now_timestamp);

    if let Some(stale_id) = state::load(state_path)? {
        match db.session(&stale_id) {
            Ok(stale) if stale.end_time.is_none() => {
                db.end_session(&stale_id, &timestamp)?;
                tracing::debug!(session_id = %stale_id, "closed dangling session");
            }
            Ok(_) => {}
            // The marker can outlive the database it points into.
            Err(DbError::SessionNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let session = db.create_session(project, &timestamp)?;
    state::store(state_path, &session.id)?;
    writeln!(out, "{}", session.id)?;
    Ok(())
}

/// Ends the active session and clears the marker.
pub fn end<W: Write>(
    out: &mut W,
    db: &Database,
    state_path: &Path,
    timestamp: Option<String>,
) -> Result<()> {
    let session_id = state::load(state_path)?
        .context("no active session; run 'ct session start' first")?;
    let timestamp = timestamp.unwrap_or_else(now_timestamp);

    let session = db.end_session(&session_id, &timestamp)?;
    state::clear(state_path)?;

    writeln!(
        out,
        "Ended session {} for {} ({})",
        session.id,
        session.project_name,
        format_minutes(session.duration_minutes.unwrap_or(0.0))
    )?;
    Ok(())
}

/// Shows the active session as JSON, or a note when there is none.
pub fn current<W: Write>(
    out: &mut W,
    db: &Database,
    state_path: &Path,
    project: Option<&str>,
) -> Result<()> {
    let session = match project {
        Some(project) => db.current_session(project)?,
        None => match state::load(state_path)? {
            Some(id) => match db.session(&id) {
                Ok(session) if session.end_time.is_none() => Some(session),
                Ok(_) | Err(DbError::SessionNotFound(_)) => None,
                Err(e) => return Err(e.into()),
            },
            None => None,
        },
    };

    match session {
        Some(session) => print_session(out, &session)?,
        None => writeln!(out, "No active session.")?,
    }
    Ok(())
}

fn print_session<W: Write>(out: &mut W, session: &Session) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    writeln!(out, "{json}")?;
    Ok(())
}
