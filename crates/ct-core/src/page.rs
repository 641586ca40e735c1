//! Token-budget-bounded activity page assembly.
//!
//! Activity exports are consumed by token-limited callers, so pages are cut
//! by estimated serialized size rather than row count. Rows arrive newest
//! first; when the next record would push the page past its budget, the page
//! ends and the excluded record's timestamp becomes the continuation cursor.
//! Replaying the cursor as a strict upper bound on the next call yields a
//! gapless, non-overlapping concatenation of the full filtered set, provided
//! the store is not mutated between calls.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::attrs::{self, Attrs, AttrsError};

/// Default token budget for one activity page.
pub const DEFAULT_TOKEN_LIMIT: usize = 20_000;

/// Fixed allowance for the page envelope (cursor, flags, counts) on top of
/// the summed record sizes.
pub const PAGE_OVERHEAD_TOKENS: usize = 200;

/// Errors from page assembly.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Attrs(#[from] AttrsError),
    #[error("failed to serialize activity record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One activity joined with its owning session, ready for flattening.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub id: String,
    pub session_id: String,
    pub activity_type: String,
    /// RFC 3339 timestamp as stored; doubles as the continuation cursor.
    pub timestamp: String,
    pub project_path: String,
    pub project_name: String,
    pub session_start: String,
    /// Raw metadata JSON, if any.
    pub metadata: Option<String>,
    /// Raw tool payload JSON, if any.
    pub tool_detail: Option<String>,
}

/// A page of flattened activity records, newest first.
#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub activities: Vec<Map<String, Value>>,
    pub count: usize,
    /// Summed record estimates plus the envelope allowance.
    pub estimated_tokens: usize,
    pub has_more: bool,
    /// Timestamp of the first record that did not fit; feed back as the
    /// next call's strict upper bound.
    pub continue_after: Option<String>,
}

/// Estimates the token footprint of a record: serialized JSON characters
/// divided by four, rounded up.
pub fn estimate_tokens(record: &Map<String, Value>) -> Result<usize, PageError> {
    let serialized = serde_json::to_string(record)?;
    Ok(serialized.len().div_ceil(4))
}

/// Flattens one activity row into a dot-path record.
///
/// Base fields come first, then `metadata.*` and `tool_detail.*` leaves.
/// Without an explicit field list, known-large leaves are stripped; with
/// one, the record is projected to exactly the requested keys in request
/// order.
pub fn flatten_row(
    row: &ExportRow,
    fields: Option<&[String]>,
) -> Result<Map<String, Value>, AttrsError> {
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(row.id.clone()));
    record.insert(
        "session_id".to_string(),
        Value::String(row.session_id.clone()),
    );
    record.insert(
        "activity_type".to_string(),
        Value::String(row.activity_type.clone()),
    );
    record.insert(
        "timestamp".to_string(),
        Value::String(row.timestamp.clone()),
    );
    record.insert(
        "project_path".to_string(),
        Value::String(row.project_path.clone()),
    );
    record.insert(
        "project_name".to_string(),
        Value::String(row.project_name.clone()),
    );
    record.insert(
        "session_start".to_string(),
        Value::String(row.session_start.clone()),
    );

    if let Some(metadata) = &row.metadata {
        Attrs::parse(metadata).flatten_into("metadata", &mut record)?;
    }
    if let Some(tool_detail) = &row.tool_detail {
        Attrs::parse(tool_detail).flatten_into("tool_detail", &mut record)?;
    }

    match fields {
        Some(fields) if !fields.is_empty() => Ok(attrs::project_fields(&record, fields)),
        _ => {
            attrs::strip_large_fields(&mut record);
            Ok(record)
        }
    }
}

/// Assembles a page from newest-first rows under a token budget.
///
/// A record is never split: if the next record would exceed the budget it is
/// excluded whole, even when it is the first one. Callers seeing an empty
/// page with `has_more = true` need a larger limit or narrower filters.
pub fn build_page<I>(
    rows: I,
    fields: Option<&[String]>,
    token_limit: usize,
) -> Result<ActivityPage, PageError>
where
    I: IntoIterator<Item = ExportRow>,
{
    let mut activities = Vec::new();
    let mut running = 0;
    let mut has_more = false;
    let mut continue_after = None;

    for row in rows {
        let record = flatten_row(&row, fields)?;
        let size = estimate_tokens(&record)?;
        if running + size + PAGE_OVERHEAD_TOKENS > token_limit {
            tracing::debug!(
                emitted = activities.len(),
                candidate_tokens = size,
                token_limit,
                "page budget reached"
            );
            has_more = true;
            continue_after = Some(row.timestamp);
            break;
        }
        running += size;
        activities.push(record);
    }

    Ok(ActivityPage {
        count: activities.len(),
        estimated_tokens: running + PAGE_OVERHEAD_TOKENS,
        activities,
        has_more,
        continue_after,
    })
}
