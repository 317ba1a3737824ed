//! All-or-nothing file output.

use crate::error::{AnalysisError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `bytes` to `path` atomically.
///
/// The content goes to a temporary file in the destination directory, which
/// is renamed over `path` only once fully written. On failure the temporary
/// file is removed and any previous file at `path` is left untouched. The
/// destination directory is created if absent.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| AnalysisError::report_write(path, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| AnalysisError::report_write(path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| AnalysisError::report_write(path, e))?;
    tmp.persist(path)
        .map_err(|e| AnalysisError::report_write(path, e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
