//! Activity logging command.
//!
//! Hook scripts pass metadata and tool payloads either as inline JSON or
//! base64-encoded, since tool payloads routinely contain quotes, newlines
//! and shell metacharacters. A payload that fails to decode is dropped with
//! a warning rather than failing the whole activity; losing an attachment
//! is better than losing the activity signal.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ct_db::Database;

use crate::cli::LogArgs;
use crate::commands::util::now_timestamp;
use crate::state;

/// Runs the log command, printing the new activity id.
pub fn run<W: Write>(out: &mut W, db: &Database, state_path: &Path, args: LogArgs) -> Result<()> {
    let session_id = match args.session {
        Some(id) => id,
        None => state::load(state_path)?
            .context("no active session; run 'ct session start' first")?,
    };
    let timestamp = args.timestamp.unwrap_or_else(now_timestamp);

    let metadata = decode_payload(args.metadata, args.metadata_base64, "metadata");
    let tool_detail = decode_payload(args.tool_detail, args.tool_detail_base64, "tool_detail");

    let activity = db.log_activity(
        &session_id,
        &args.kind,
        &timestamp,
        metadata.as_deref(),
        tool_detail.as_deref(),
    )?;
    writeln!(out, "{}", activity.id)?;
    Ok(())
}

/// Resolves a payload from its inline or base64-encoded form.
///
/// Inline wins when both are somehow present. Decode failures return `None`.
fn decode_payload(inline: Option<String>, encoded: Option<String>, label: &str) -> Option<String> {
    if inline.is_some() {
        return inline;
    }
    let encoded = encoded?;

    let bytes = match STANDARD.decode(encoded.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(payload = label, error = %e, "discarding payload that is not valid base64");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(payload = label, error = %e, "discarding payload that is not UTF-8");
            None
        }
    }
}
