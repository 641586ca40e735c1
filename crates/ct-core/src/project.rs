//! Project identification from path-like identifiers.

/// Derives a display name from a project path.
///
/// The last path segment is used, handling both separator styles. An empty
/// path or one ending in a separator falls back to `"Unknown"`.
pub fn display_name(project_path: &str) -> String {
    project_path
        .rsplit(['/', '\\'])
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}
