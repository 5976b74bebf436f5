//! Sequential writer for one artifact file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Write sink for an artifact. Owns the only handle to the file; dropping the
/// writer closes it, leaving whatever was written on disk.
pub struct ArtifactWriter {
    file: File,
    path: PathBuf,
    bytes_written: u64,
}

impl ArtifactWriter {
    /// Create (or truncate) the file at `path`, creating missing parent directories.
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create artifact: {}", path.display()))?;
        Ok(ArtifactWriter {
            file,
            path: path.to_path_buf(),
            bytes_written: 0,
        })
    }

    /// Append `data` at the current end of the artifact.
    pub async fn write_chunk(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .await
            .with_context(|| format!("write to {} failed", self.path.display()))?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close without fsync. For artifacts abandoned mid-transfer.
    pub async fn close(mut self) -> Result<u64> {
        self.file
            .flush()
            .await
            .with_context(|| format!("flush of {} failed", self.path.display()))?;
        Ok(self.bytes_written)
    }

    /// Flush and fsync, then close the file. Returns the total bytes written.
    pub async fn finish(mut self) -> Result<u64> {
        self.file
            .flush()
            .await
            .with_context(|| format!("flush of {} failed", self.path.display()))?;
        self.file
            .sync_all()
            .await
            .with_context(|| format!("sync of {} failed", self.path.display()))?;
        Ok(self.bytes_written)
    }
}
