//! Bounded activity retrieval.
//!
//! Fetches activities newest first with all filters applied in SQL, then
//! hands the rows to the page assembler in `ct-core` which cuts the page at
//! the token budget. Pages are best-effort snapshots: no isolation is taken
//! against concurrent writers, so boundaries can shift if the store is
//! mutated between chained calls.

use chrono::NaiveDate;
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use ct_core::{ActivityPage, DEFAULT_TOKEN_LIMIT, ExportRow, build_page};

use crate::{Database, DbError};

/// Filters for activity retrieval. All are optional and AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    /// Earliest activity calendar date, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Latest activity calendar date, inclusive.
    pub end_date: Option<NaiveDate>,
    pub session_id: Option<String>,
    pub activity_type: Option<String>,
    pub project_path: Option<String>,
    /// Hard cap on candidate rows, applied before the token budget.
    pub limit: Option<usize>,
    /// Explicit dot-path allow-list; disables the default large-field
    /// exclusions.
    pub fields: Option<Vec<String>>,
    /// Only include activities strictly earlier than this timestamp.
    /// Feed a previous page's `continue_after` here to fetch the next page.
    pub continue_after: Option<String>,
    /// Token budget for the page; defaults to
    /// [`ct_core::DEFAULT_TOKEN_LIMIT`].
    pub token_limit: Option<usize>,
}

impl Database {
    /// Retrieves a token-budget-bounded page of flattened activities,
    /// newest first.
    pub fn activity_page(&self, query: &ActivityQuery) -> Result<ActivityPage, DbError> {
        let mut sql = String::from(
            "
            SELECT
                a.id,
                a.session_id,
                a.activity_type,
                a.timestamp,
                a.metadata,
                a.tool_detail,
                s.project_path,
                s.project_name,
                s.start_time
            FROM activities a
            JOIN sessions s ON a.session_id = s.id
            ",
        );

        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(start_date) = query.start_date {
            clauses.push("DATE(a.timestamp) >= DATE(?)");
            params.push(Value::Text(start_date.to_string()));
        }
        if let Some(end_date) = query.end_date {
            clauses.push("DATE(a.timestamp) <= DATE(?)");
            params.push(Value::Text(end_date.to_string()));
        }
        if let Some(session_id) = &query.session_id {
            clauses.push("a.session_id = ?");
            params.push(Value::Text(session_id.clone()));
        }
        if let Some(activity_type) = &query.activity_type {
            clauses.push("a.activity_type = ?");
            params.push(Value::Text(activity_type.clone()));
        }
        if let Some(project_path) = &query.project_path {
            clauses.push("s.project_path = ?");
            params.push(Value::Text(project_path.clone()));
        }
        if let Some(continue_after) = &query.continue_after {
            clauses.push("a.timestamp < ?");
            params.push(Value::Text(continue_after.clone()));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY a.timestamp DESC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            #[allow(clippy::cast_possible_wrap)]
            params.push(Value::Integer(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(ExportRow {
                id: row.get(0)?,
                session_id: row.get(1)?,
                activity_type: row.get(2)?,
                timestamp: row.get(3)?,
                metadata: row.get(4)?,
                tool_detail: row.get(5)?,
                project_path: row.get(6)?,
                project_name: row.get(7)?,
                session_start: row.get(8)?,
            })
        })?;

        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row?);
        }

        let token_limit = query.token_limit.unwrap_or(DEFAULT_TOKEN_LIMIT);
        let page = build_page(candidates, query.fields.as_deref(), token_limit)?;
        Ok(page)
    }
}
