use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default transfer budget: five minutes from the first byte requested.
pub const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 300;

/// Fixed container extension of every artifact.
pub const VIDEO_EXTENSION: &str = "mp4";

const DEFAULT_ORIGIN: &str = "https://www.youtube.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Configuration threaded into a `Fetcher` at construction.
/// Loaded from `~/.config/vidfetch/config.toml`.
/// Keys missing from the file take their `Default` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Directory artifacts are written to. Created by `Fetcher::new` if absent.
    pub download_dir: PathBuf,
    /// Wall-clock budget for one transfer, in seconds.
    pub transfer_timeout_secs: u64,
    /// Scheme and host the watch page is requested from.
    pub origin: String,
    /// User-Agent sent with both the lookup and the stream request.
    pub user_agent: String,
    /// TCP/TLS connect timeout for both requests.
    pub connect_timeout_secs: u64,
    /// Total timeout of the metadata lookup request.
    pub metadata_timeout_secs: u64,
    /// Depth of the reader → writer chunk channel.
    pub chunk_buffer: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./downloads"),
            transfer_timeout_secs: DEFAULT_TRANSFER_TIMEOUT_SECS,
            origin: DEFAULT_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 15,
            metadata_timeout_secs: 30,
            chunk_buffer: 32,
        }
    }
}

impl FetchConfig {
    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.transfer_timeout_secs == 0 {
            anyhow::bail!("transfer_timeout_secs must be greater than zero");
        }
        if self.metadata_timeout_secs == 0 {
            anyhow::bail!("metadata_timeout_secs must be greater than zero");
        }
        if self.chunk_buffer == 0 {
            anyhow::bail!("chunk_buffer must be greater than zero");
        }
        let origin = url::Url::parse(&self.origin)
            .with_context(|| format!("origin is not a valid URL: {:?}", self.origin))?;
        if origin.scheme() != "http" && origin.scheme() != "https" {
            anyhow::bail!("origin must be http or https, got {}", origin.scheme());
        }
        if self.download_dir.as_os_str().is_empty() {
            anyhow::bail!("download_dir must not be empty");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
