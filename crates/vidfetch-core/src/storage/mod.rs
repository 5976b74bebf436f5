//! Disk I/O and artifact lifecycle.
//!
//! Creates the artifact file (and its parent directories), writes chunks
//! sequentially with an fsync before completion is reported, and deletes
//! artifacts on request without ever failing the caller.

mod writer;

pub use writer::ArtifactWriter;

use std::path::Path;

/// Best-effort removal of a previously produced artifact.
///
/// A missing file is a no-op. Any other error is logged and swallowed, so
/// calling this any number of times on the same path never fails.
pub async fn cleanup(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::info!(path = %path.display(), "artifact removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "artifact does not exist, no cleanup needed")
        }
        Err(e) => tracing::warn!(path = %path.display(), "could not remove artifact: {}", e),
    }
}
