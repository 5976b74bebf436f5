//! `vidfetch fetch <url>` – download one video and print its descriptor.

use anyhow::Result;
use vidfetch_core::config::FetchConfig;
use vidfetch_core::Fetcher;

/// Runs the pipeline and prints the descriptor as pretty JSON on stdout.
/// Returns the descriptor's status.
pub async fn run_fetch(cfg: FetchConfig, url: &str) -> Result<bool> {
    let fetcher = Fetcher::new(cfg)?;
    tracing::debug!(
        download_dir = %fetcher.config().download_dir.display(),
        deadline = ?fetcher.config().transfer_timeout(),
        "fetch requested"
    );
    let descriptor = fetcher.fetch(url).await;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(descriptor.status())
}
