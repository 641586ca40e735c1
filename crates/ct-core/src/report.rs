//! Time report aggregation.
//!
//! Groups per-session active minutes by calendar day and by project display
//! name. Reports are recomputed from store contents on every request; there
//! is no caching.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Per-session input to report aggregation.
#[derive(Debug, Clone)]
pub struct SessionSlice {
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// Project display name the session belongs to.
    pub project_name: String,
    /// Estimated active minutes for the session.
    pub active_minutes: f64,
}

/// Session count and summed minutes for one breakdown key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BreakdownSlot {
    pub sessions: u64,
    pub minutes: f64,
}

/// Aggregate active-time report for a date range.
#[derive(Debug, Serialize)]
pub struct TimeReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_minutes: f64,
    pub total_hours: f64,
    pub total_sessions: usize,
    /// Keyed by the session's start calendar date, ascending.
    pub daily_breakdown: BTreeMap<NaiveDate, BreakdownSlot>,
    /// Keyed by project display name.
    pub project_breakdown: BTreeMap<String, BreakdownSlot>,
}

/// Builds a report from pre-scored sessions.
///
/// An empty slice is not an error; it yields zero totals and empty
/// breakdowns.
pub fn build_report(
    start_date: NaiveDate,
    end_date: NaiveDate,
    sessions: &[SessionSlice],
) -> TimeReport {
    let mut total_minutes = 0.0;
    let mut daily_breakdown: BTreeMap<NaiveDate, BreakdownSlot> = BTreeMap::new();
    let mut project_breakdown: BTreeMap<String, BreakdownSlot> = BTreeMap::new();

    for session in sessions {
        total_minutes += session.active_minutes;

        let day = daily_breakdown
            .entry(session.start_time.date_naive())
            .or_default();
        day.sessions += 1;
        day.minutes += session.active_minutes;

        let project = project_breakdown
            .entry(session.project_name.clone())
            .or_default();
        project.sessions += 1;
        project.minutes += session.active_minutes;
    }

    TimeReport {
        start_date,
        end_date,
        total_minutes,
        total_hours: total_minutes / 60.0,
        total_sessions: sessions.len(),
        daily_breakdown,
        project_breakdown,
    }
}
