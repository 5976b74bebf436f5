//! `vidfetch cleanup <path>` – best-effort removal of a stored file.

use std::path::Path;
use vidfetch_core::storage;

/// Never fails; problems are logged.
pub async fn run_cleanup(path: &Path) {
    storage::cleanup(path).await;
    println!("Cleaned up {}", path.display());
}
