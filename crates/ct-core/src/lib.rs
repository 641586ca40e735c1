//! Core domain logic for the coding session tracker.
//!
//! This crate contains the policy pieces with no I/O attached:
//! - Active-time estimation: idle-gap-capped minutes from activity timestamps
//! - Attribute flattening: nested metadata maps to dot-path records
//! - Report aggregation: daily and per-project time breakdowns
//! - Page assembly: token-budget-bounded activity exports

pub mod active_time;
pub mod activity_kind;
pub mod attrs;
pub mod page;
pub mod project;
pub mod report;

pub use active_time::{EstimatorConfig, estimate_active_minutes};
pub use activity_kind::{ActivityKind, UnknownActivityKind};
pub use attrs::{Attrs, AttrsError, DEFAULT_EXCLUDED_FIELDS, flatten_value, project_fields};
pub use page::{ActivityPage, DEFAULT_TOKEN_LIMIT, ExportRow, PageError, build_page};
pub use project::display_name;
pub use report::{BreakdownSlot, SessionSlice, TimeReport, build_report};
