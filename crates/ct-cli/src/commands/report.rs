//! Report command for rendering active-time reports.
//!
//! Human output shows totals, a per-project breakdown sorted by time spent,
//! and a chronological per-day breakdown. `--json` emits the raw report for
//! scripting.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use ct_core::TimeReport;
use ct_db::Database;

use crate::cli::ReportArgs;
use crate::commands::util::format_minutes;
use crate::config::Config;

/// Runs the report command.
pub fn run<W: Write>(out: &mut W, db: &Database, config: &Config, args: &ReportArgs) -> Result<()> {
    let report = db.time_report(
        &config.estimator_config(),
        args.start_date,
        args.end_date,
        args.project.as_deref(),
    )?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(out, "{}", format_report(&report))?;
    }
    Ok(())
}

/// Formats the human-readable report output.
pub fn format_report(report: &TimeReport) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "TIME REPORT: {} to {}",
        report.start_date, report.end_date
    )
    .unwrap();

    if report.total_sessions == 0 {
        writeln!(output).unwrap();
        writeln!(output, "No sessions recorded in this range.").unwrap();
        return output;
    }

    let plural = if report.total_sessions == 1 { "" } else { "s" };
    writeln!(output).unwrap();
    writeln!(
        output,
        "Total: {} across {} session{plural}",
        format_minutes(report.total_minutes),
        report.total_sessions
    )
    .unwrap();

    writeln!(output).unwrap();
    writeln!(output, "BY PROJECT").unwrap();
    writeln!(output, "──────────").unwrap();

    let mut projects: Vec<_> = report.project_breakdown.iter().collect();
    projects.sort_by(|a, b| b.1.minutes.total_cmp(&a.1.minutes));
    for (name, slot) in projects {
        let plural = if slot.sessions == 1 { "" } else { "s" };
        writeln!(
            output,
            "{name:<28}{:>8}  ({} session{plural})",
            format_minutes(slot.minutes),
            slot.sessions
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "BY DAY").unwrap();
    writeln!(output, "──────").unwrap();

    for (day, slot) in &report.daily_breakdown {
        let plural = if slot.sessions == 1 { "" } else { "s" };
        writeln!(
            output,
            "{day}  {:>8}  ({} session{plural})",
            format_minutes(slot.minutes),
            slot.sessions
        )
        .unwrap();
    }

    output
}
