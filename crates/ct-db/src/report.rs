//! Time report orchestration.
//!
//! Selects sessions by start calendar date, scores each one with the
//! active-time estimator, and hands the results to the aggregator. The
//! report is a best-effort snapshot: other processes may log activities
//! while it is being computed, and whatever the store returns at read time
//! is what gets counted.

use chrono::{NaiveDate, Utc};
use rusqlite::params_from_iter;

use ct_core::{EstimatorConfig, SessionSlice, TimeReport, build_report, estimate_active_minutes};

use crate::{Database, DbError, parse_timestamp};

impl Database {
    /// Builds an active-time report for sessions starting within
    /// `[start_date, end_date]` inclusive, by calendar date.
    ///
    /// `end_date` defaults to today. When `project_path` is given, only
    /// sessions with that exact project identifier are counted. An empty
    /// selection produces a zero report, not an error.
    pub fn time_report(
        &self,
        config: &EstimatorConfig,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        project_path: Option<&str>,
    ) -> Result<TimeReport, DbError> {
        let end_date = end_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut sql = String::from(
            "
            SELECT id, project_name, start_time, duration_minutes
            FROM sessions
            WHERE DATE(start_time) >= DATE(?) AND DATE(start_time) <= DATE(?)
            ",
        );
        let mut params = vec![start_date.to_string(), end_date.to_string()];
        if let Some(project_path) = project_path {
            sql.push_str(" AND project_path = ?");
            params.push(project_path.to_string());
        }
        sql.push_str(" ORDER BY start_time DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, project_name, start_time, duration_minutes) = row?;
            let timestamps = self.activity_timestamps(&id)?;
            let active_minutes = estimate_active_minutes(config, duration_minutes, &timestamps);
            sessions.push(SessionSlice {
                start_time: parse_timestamp(&start_time, &id)?,
                project_name,
                active_minutes,
            });
        }
        tracing::debug!(sessions = sessions.len(), %start_date, %end_date, "report computed");

        Ok(build_report(start_date, end_date, &sessions))
    }

    /// Returns a session's activity timestamps ordered ascending.
    fn activity_timestamps(
        &self,
        session_id: &str,
    ) -> Result<Vec<chrono::DateTime<Utc>>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp
            FROM activities
            WHERE session_id = ?
            ORDER BY timestamp ASC
            ",
        )?;
        let rows = stmt.query_map([session_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut timestamps = Vec::new();
        for row in rows {
            let (id, timestamp) = row?;
            timestamps.push(parse_timestamp(&timestamp, &id)?);
        }
        Ok(timestamps)
    }
}
