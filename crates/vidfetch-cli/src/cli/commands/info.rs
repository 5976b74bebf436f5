//! `vidfetch info <url>` – print metadata without downloading.

use anyhow::Result;
use vidfetch_core::config::FetchConfig;
use vidfetch_core::Fetcher;

pub async fn run_info(cfg: FetchConfig, url: &str) -> Result<()> {
    let fetcher = Fetcher::new(cfg)?;
    let metadata = fetcher.fetch_metadata(url).await?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
