//! Activities export command.
//!
//! Output is always JSON; the page envelope carries `has_more` and
//! `continue_after` so callers can chain invocations under a token budget.

use std::io::Write;

use anyhow::Result;
use ct_db::{ActivityQuery, Database};

use crate::cli::ActivitiesArgs;

/// Runs the activities command.
pub fn run<W: Write>(out: &mut W, db: &Database, args: ActivitiesArgs) -> Result<()> {
    let query = ActivityQuery {
        start_date: args.start_date,
        end_date: args.end_date,
        session_id: args.session,
        activity_type: args.kind,
        project_path: args.project,
        limit: args.limit,
        fields: args.fields,
        continue_after: args.continue_after,
        token_limit: args.token_limit,
    };

    let page = db.activity_page(&query)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&page)?)?;
    Ok(())
}
