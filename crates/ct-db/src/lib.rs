//! Storage layer for the coding session tracker.
//!
//! Provides persistence for sessions and their activities using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`: an instance can be moved between threads but not shared
//! without external synchronization. Every invocation of the tracker is a
//! short-lived single-threaded call against a durable store, so no locking
//! is done here; other processes may write to the same database between
//! calls and last-write-wins is the accepted outcome.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format (e.g.
//! `2024-01-15T10:30:00Z`) so lexicographic ordering matches chronological
//! ordering and range scans can compare strings directly.
//!
//! The `metadata` and `tool_detail` columns hold free-form JSON text.
//! `tool_detail` typically carries the full raw payload of a tool
//! invocation and can reach megabyte scale; it is only ever parsed at query
//! time, never on the write path.

mod page;
mod report;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use ct_core::{ActivityKind, PageError, display_name};

pub use page::ActivityQuery;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database. Propagated unmodified; no
    /// retry is attempted here.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A referenced session does not exist.
    #[error("session {0} not found")]
    SessionNotFound(String),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {record_id}: {timestamp}")]
    TimestampParse {
        record_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Flattening or serializing an activity record failed.
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    pub(crate) conn: Connection,
}

/// A tracked coding session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub project_path: String,
    pub project_name: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration_minutes: Option<f64>,
    pub message_count: i64,
    pub tool_use_count: i64,
    pub assistant_response_count: i64,
}

/// A logged activity, as returned from the write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: String,
    pub session_id: String,
    pub activity_type: String,
    pub timestamp: String,
}

const SESSION_COLUMNS: &str = "id, project_path, project_name, start_time, end_time, \
     duration_minutes, message_count, tool_use_count, assistant_response_count";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                project_path TEXT NOT NULL,
                project_name TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT,
                duration_minutes REAL,
                message_count INTEGER DEFAULT 0,
                tool_use_count INTEGER DEFAULT 0,
                assistant_response_count INTEGER DEFAULT 0,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_start_time ON sessions(start_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project_path);

            -- Activities are immutable once written; metadata and
            -- tool_detail hold raw JSON text parsed only at query time.
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                activity_type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                metadata TEXT,
                tool_detail TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (session_id) REFERENCES sessions(id)
            );

            CREATE INDEX IF NOT EXISTS idx_activities_session ON activities(session_id);
            CREATE INDEX IF NOT EXISTS idx_activities_timestamp ON activities(timestamp);
            ",
        )?;
        Ok(())
    }

    /// Creates a new session starting at `timestamp`.
    ///
    /// The display name is derived from the last segment of the project
    /// path. Sessions are created exactly once and never deleted.
    pub fn create_session(&self, project_path: &str, timestamp: &str) -> Result<Session, DbError> {
        let id = Uuid::new_v4().to_string();
        let project_name = display_name(project_path);

        self.conn.execute(
            "
            INSERT INTO sessions (id, project_path, project_name, start_time)
            VALUES (?, ?, ?, ?)
            ",
            params![id, project_path, project_name, timestamp],
        )?;
        tracing::debug!(session_id = %id, project = %project_name, "session created");

        Ok(Session {
            id,
            project_path: project_path.to_string(),
            project_name,
            start_time: timestamp.to_string(),
            end_time: None,
            duration_minutes: None,
            message_count: 0,
            tool_use_count: 0,
            assistant_response_count: 0,
        })
    }

    /// Closes a session, recording its end time and wall-clock duration.
    ///
    /// The duration is `end - start` in minutes and may be negative when the
    /// caller supplies out-of-order timestamps; the model does not enforce
    /// ordering, the active-time estimator clamps.
    pub fn end_session(&self, session_id: &str, timestamp: &str) -> Result<Session, DbError> {
        let start_time: String = self
            .conn
            .query_row(
                "SELECT start_time FROM sessions WHERE id = ?",
                [session_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::SessionNotFound(session_id.to_string()))?;

        let start = parse_timestamp(&start_time, session_id)?;
        let end = parse_timestamp(timestamp, session_id)?;
        #[allow(clippy::cast_precision_loss)]
        let duration_minutes = (end - start).num_milliseconds() as f64 / 60_000.0;

        self.conn.execute(
            "UPDATE sessions SET end_time = ?, duration_minutes = ? WHERE id = ?",
            params![timestamp, duration_minutes, session_id],
        )?;

        self.session(session_id)
    }

    /// Records an activity against a session and bumps the matching
    /// counter.
    ///
    /// `activity_type` is an open string; unrecognized kinds are stored
    /// as-is and simply don't touch any counter. Activities are immutable
    /// once created.
    pub fn log_activity(
        &self,
        session_id: &str,
        activity_type: &str,
        timestamp: &str,
        metadata: Option<&str>,
        tool_detail: Option<&str>,
    ) -> Result<Activity, DbError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "
            INSERT INTO activities (id, session_id, activity_type, timestamp, metadata, tool_detail)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![id, session_id, activity_type, timestamp, metadata, tool_detail],
        )?;

        let counter = match activity_type.parse::<ActivityKind>() {
            Ok(ActivityKind::Message) => Some("message_count"),
            Ok(ActivityKind::AssistantResponse) => Some("assistant_response_count"),
            Ok(ActivityKind::ToolUse) => Some("tool_use_count"),
            Ok(ActivityKind::Error | ActivityKind::Other) | Err(_) => None,
        };
        if let Some(counter) = counter {
            // Column name comes from the fixed list above, never from input.
            self.conn.execute(
                &format!("UPDATE sessions SET {counter} = {counter} + 1 WHERE id = ?"),
                [session_id],
            )?;
        }

        Ok(Activity {
            id,
            session_id: session_id.to_string(),
            activity_type: activity_type.to_string(),
            timestamp: timestamp.to_string(),
        })
    }

    /// Returns a session by id.
    pub fn session(&self, session_id: &str) -> Result<Session, DbError> {
        self.conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?"),
                [session_id],
                read_session,
            )
            .optional()?
            .ok_or_else(|| DbError::SessionNotFound(session_id.to_string()))
    }

    /// Returns the most recent open session for a project, if any.
    pub fn current_session(&self, project_path: &str) -> Result<Option<Session>, DbError> {
        let session = self
            .conn
            .query_row(
                &format!(
                    "
                    SELECT {SESSION_COLUMNS}
                    FROM sessions
                    WHERE project_path = ? AND end_time IS NULL
                    ORDER BY start_time DESC
                    LIMIT 1
                    "
                ),
                [project_path],
                read_session,
            )
            .optional()?;
        Ok(session)
    }

    /// Lists the most recent sessions, newest first.
    pub fn recent_sessions(
        &self,
        limit: usize,
        project_path: Option<&str>,
    ) -> Result<Vec<Session>, DbError> {
        #[allow(clippy::cast_possible_wrap)]
        let limit = limit as i64;
        let mut sessions = Vec::new();

        if let Some(project_path) = project_path {
            let mut stmt = self.conn.prepare(&format!(
                "
                SELECT {SESSION_COLUMNS}
                FROM sessions
                WHERE project_path = ?
                ORDER BY start_time DESC
                LIMIT ?
                "
            ))?;
            let rows = stmt.query_map(params![project_path, limit], read_session)?;
            for row in rows {
                sessions.push(row?);
            }
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "
                SELECT {SESSION_COLUMNS}
                FROM sessions
                ORDER BY start_time DESC
                LIMIT ?
                "
            ))?;
            let rows = stmt.query_map([limit], read_session)?;
            for row in rows {
                sessions.push(row?);
            }
        }
        Ok(sessions)
    }
}

fn read_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        project_path: row.get(1)?,
        project_name: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        duration_minutes: row.get(5)?,
        message_count: row.get(6)?,
        tool_use_count: row.get(7)?,
        assistant_response_count: row.get(8)?,
    })
}

pub(crate) fn parse_timestamp(timestamp: &str, record_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record_id: record_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn open_creates_file_database() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ct.db");
        let db = Database::open(&path).unwrap();
        db.create_session("/repo/alpha", "2025-01-01T09:00:00Z")
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn create_session_derives_project_name() {
        let db = Database::open_in_memory().unwrap();
        let session = db
            .create_session("/home/dev/projects/alpha", "2025-01-01T09:00:00Z")
            .unwrap();

        assert_eq!(session.project_name, "alpha");
        assert_eq!(session.start_time, "2025-01-01T09:00:00Z");
        assert!(session.end_time.is_none());
        assert!(session.duration_minutes.is_none());

        let stored = db.session(&session.id).unwrap();
        assert_eq!(stored, session);
    }

    #[test]
    fn end_session_computes_duration() {
        let db = Database::open_in_memory().unwrap();
        let session = db
            .create_session("/repo/alpha", "2025-01-01T09:00:00Z")
            .unwrap();

        let closed = db
            .end_session(&session.id, "2025-01-01T10:00:00Z")
            .unwrap();
        assert_eq!(closed.end_time.as_deref(), Some("2025-01-01T10:00:00Z"));
        assert_eq!(closed.duration_minutes, Some(60.0));
    }

    #[test]
    fn end_session_tolerates_out_of_order_timestamps() {
        let db = Database::open_in_memory().unwrap();
        let session = db
            .create_session("/repo/alpha", "2025-01-01T09:00:00Z")
            .unwrap();

        let closed = db
            .end_session(&session.id, "2025-01-01T08:30:00Z")
            .unwrap();
        assert_eq!(closed.duration_minutes, Some(-30.0));
    }

    #[test]
    fn end_session_unknown_id_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let result = db.end_session("nope", "2025-01-01T10:00:00Z");
        assert!(matches!(result, Err(DbError::SessionNotFound(id)) if id == "nope"));
    }

    #[test]
    fn log_activity_bumps_matching_counters() {
        let db = Database::open_in_memory().unwrap();
        let session = db
            .create_session("/repo/alpha", "2025-01-01T09:00:00Z")
            .unwrap();

        for kind in [
            "message",
            "message",
            "tool_use",
            "assistant_response",
            "error",
            "custom_kind",
        ] {
            db.log_activity(&session.id, kind, "2025-01-01T09:05:00Z", None, None)
                .unwrap();
        }

        let stored = db.session(&session.id).unwrap();
        assert_eq!(stored.message_count, 2);
        assert_eq!(stored.tool_use_count, 1);
        assert_eq!(stored.assistant_response_count, 1);
    }

    #[test]
    fn current_session_ignores_closed_and_other_projects() {
        let db = Database::open_in_memory().unwrap();
        let closed = db
            .create_session("/repo/alpha", "2025-01-01T08:00:00Z")
            .unwrap();
        db.end_session(&closed.id, "2025-01-01T08:30:00Z").unwrap();
        let open = db
            .create_session("/repo/alpha", "2025-01-01T09:00:00Z")
            .unwrap();
        db.create_session("/repo/beta", "2025-01-01T09:30:00Z")
            .unwrap();

        let current = db.current_session("/repo/alpha").unwrap();
        assert_eq!(current.map(|s| s.id), Some(open.id));

        assert!(db.current_session("/repo/gamma").unwrap().is_none());
    }

    #[test]
    fn recent_sessions_orders_newest_first_and_limits() {
        let db = Database::open_in_memory().unwrap();
        db.create_session("/repo/alpha", "2025-01-01T09:00:00Z")
            .unwrap();
        db.create_session("/repo/beta", "2025-01-02T09:00:00Z")
            .unwrap();
        db.create_session("/repo/alpha", "2025-01-03T09:00:00Z")
            .unwrap();

        let sessions = db.recent_sessions(2, None).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].start_time, "2025-01-03T09:00:00Z");
        assert_eq!(sessions[1].start_time, "2025-01-02T09:00:00Z");

        let alpha_only = db.recent_sessions(10, Some("/repo/alpha")).unwrap();
        assert_eq!(alpha_only.len(), 2);
        assert!(alpha_only.iter().all(|s| s.project_path == "/repo/alpha"));
    }
}
