//! Active session tracking.
//!
//! The id of the session being tracked on this machine is kept in a small
//! `current-session` file in the data directory. Hooks call `session start`
//! and `session end` from separate processes, so the file is the only thing
//! tying them together. A stale id (machine crash, deleted database) is
//! tolerated everywhere it is read.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Returns the path to the current-session file in the data directory.
pub fn state_file_path() -> Result<PathBuf> {
    let data_dir = crate::config::dirs_data_path().context("could not determine data directory")?;
    Ok(data_dir.join("current-session"))
}

/// Loads the active session id.
///
/// Returns `None` if no session is being tracked.
pub(crate) fn load(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let id = content.trim();
            if id.is_empty() {
                Ok(None)
            } else {
                Ok(Some(id.to_string()))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context("failed to read current-session file"),
    }
}

/// Records `session_id` as the active session.
pub(crate) fn store(path: &Path, session_id: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    std::fs::write(path, session_id).context("failed to write current-session file")?;
    Ok(())
}

/// Clears the active session marker. Missing file is fine.
pub(crate) fn clear(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("failed to remove current-session file"),
    }
}
