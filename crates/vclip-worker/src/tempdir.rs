//! Per-task temp directories (§4.3 step 3, §4.5 step 2).
//!
//! Keyed by a caller-supplied prefix plus a monotonic timestamp suffix so
//! that duplicate delivery of the same task never collides with a
//! still-in-flight or abandoned directory from a prior attempt.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

/// Create and return a fresh temp directory under `base` named
/// `<prefix>-<nanos since epoch>`.
pub fn create_task_dir(base: impl AsRef<Path>, prefix: &str) -> std::io::Result<PathBuf> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let dir = base.as_ref().join(format!("{prefix}-{nanos}"));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Remove a task temp directory, logging rather than failing the task if
/// cleanup itself errors (§7: "clean temp directories" is best-effort on
/// both the success and failure path).
pub fn cleanup_task_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "failed to remove task temp directory");
        }
    }
}
