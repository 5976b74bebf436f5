//! CLI for the vidfetch media-fetch engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidfetch_core::config;

use commands::{run_check, run_cleanup, run_fetch, run_info};

/// Top-level CLI for vidfetch.
#[derive(Debug, Parser)]
#[command(name = "vidfetch")]
#[command(about = "vidfetch: fetch a video into a local file and describe it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a video and print its result descriptor as JSON.
    Fetch {
        /// Video page URL (youtube.com, youtu.be, ...).
        url: String,
        /// Directory to store the file in (overrides download_dir from config).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Transfer deadline in seconds (overrides transfer_timeout_secs from config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Print the video's metadata as JSON without downloading it.
    Info {
        /// Video page URL.
        url: String,
    },

    /// Check whether a URL is a supported video URL. No network access.
    Check {
        /// URL to check.
        url: String,
    },

    /// Delete a previously stored file. Missing files are not an error.
    Cleanup {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    /// Parses arguments and runs the command. `Ok(false)` means the command
    /// ran but its result was a failure (invalid URL, failed fetch).
    pub async fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch { url, dir, timeout } => {
                let mut cfg = config::load_or_init()?;
                if let Some(dir) = dir {
                    cfg.download_dir = dir;
                }
                if let Some(secs) = timeout {
                    cfg.transfer_timeout_secs = secs;
                }
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(cfg, &url).await
            }
            CliCommand::Info { url } => {
                let cfg = config::load_or_init()?;
                run_info(cfg, &url).await?;
                Ok(true)
            }
            CliCommand::Check { url } => Ok(run_check(&url)),
            CliCommand::Cleanup { path } => {
                run_cleanup(&path).await;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests;
