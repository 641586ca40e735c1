//! Attribute map parsing and flattening.
//!
//! Activities carry two free-form JSON blobs: caller-supplied metadata and
//! the raw payload of a tool invocation. Both are stored as text and turned
//! into flat dot-path records (`tool_detail.tool_input.file_path`) when
//! queried, so callers can filter and project on individual leaves without
//! knowing the nesting shape.

use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum nesting depth the flattener will descend into.
///
/// Parsed JSON cannot cycle, but manually constructed values can nest
/// arbitrarily deep; bail out instead of recursing without bound.
const MAX_DEPTH: usize = 64;

/// Leaf paths excluded from flattened records by default.
///
/// These routinely carry entire file contents and blow out export budgets.
/// They are kept when the caller names fields explicitly: you asked for it
/// by name, you get it.
pub const DEFAULT_EXCLUDED_FIELDS: &[&str] = &[
    "tool_detail.tool_response.originalFile",
    "tool_detail.tool_response.file.content",
];

/// Errors from attribute flattening.
#[derive(Debug, Error)]
pub enum AttrsError {
    /// The attribute map nests deeper than [`MAX_DEPTH`] levels.
    #[error("malformed attribute map: nesting exceeds {MAX_DEPTH} levels")]
    MalformedAttributes,
}

/// A stored attribute blob, either parsed or preserved verbatim.
///
/// Malformed JSON degrades to `Raw` rather than failing, so one bad record
/// never aborts a whole report or page.
#[derive(Debug, Clone, PartialEq)]
pub enum Attrs {
    /// Valid JSON object.
    Parsed(Map<String, Value>),
    /// Anything else: unparseable text, or JSON that is not an object.
    Raw(String),
}

impl Attrs {
    /// Parses a stored JSON blob.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self::Parsed(map),
            _ => Self::Raw(text.to_string()),
        }
    }

    /// Flattens this blob into `out` under `prefix`.
    ///
    /// `Raw` text becomes a single `{prefix}.raw` leaf.
    pub fn flatten_into(
        &self,
        prefix: &str,
        out: &mut Map<String, Value>,
    ) -> Result<(), AttrsError> {
        match self {
            Self::Parsed(map) => flatten_map(map, prefix, out, 0),
            Self::Raw(text) => {
                out.insert(format!("{prefix}.raw"), Value::String(text.clone()));
                Ok(())
            }
        }
    }
}

/// Flattens a nested map into dot-path keys.
///
/// Only nested objects are descended into; scalars, arrays, and `null` are
/// leaf values. Key order follows the input map, so the output is
/// deterministic for deterministic input.
pub fn flatten_value(
    map: &Map<String, Value>,
    prefix: &str,
) -> Result<Map<String, Value>, AttrsError> {
    let mut out = Map::new();
    flatten_map(map, prefix, &mut out, 0)?;
    Ok(out)
}

fn flatten_map(
    map: &Map<String, Value>,
    prefix: &str,
    out: &mut Map<String, Value>,
    depth: usize,
) -> Result<(), AttrsError> {
    if depth >= MAX_DEPTH {
        return Err(AttrsError::MalformedAttributes);
    }
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_map(nested, &path, out, depth + 1)?,
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}

/// Restricts `record` to the requested keys, preserving request order.
///
/// Requested keys that do not exist in the record are silently omitted.
pub fn project_fields(record: &Map<String, Value>, fields: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields {
        if let Some(value) = record.get(field) {
            out.insert(field.clone(), value.clone());
        }
    }
    out
}

/// Deletes the known-large leaf paths from a flattened record.
pub fn strip_large_fields(record: &mut Map<String, Value>) {
    for field in DEFAULT_EXCLUDED_FIELDS {
        record.remove(*field);
    }
}
