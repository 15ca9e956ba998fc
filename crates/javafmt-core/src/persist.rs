//! Fault-tolerant file writing
//!
//! Formatted output replaces the original file through a temporary file in
//! the same directory followed by an atomic rename, so a crash mid-write can
//! never leave a half-written source file behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::JavafmtError;
use crate::result::Result;

/// Write `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| JavafmtError::io(path, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| JavafmtError::io(path, e))?;
    tmp.flush().map_err(|e| JavafmtError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| JavafmtError::io(path, e.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(())
}

/// Read a source file as UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| JavafmtError::io(path, e))
}
