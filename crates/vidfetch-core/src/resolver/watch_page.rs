//! Watch-page lookup over HTTP.
//!
//! Uses the curl crate (libcurl) to GET `{origin}/watch?v=<id>` and hands the
//! body to the player-response parser. No payload bytes are transferred.

use std::str;
use std::time::Duration;

use super::{player_response, ResourceMetadata, Resolver};
use crate::config::FetchConfig;
use crate::error::MetadataError;

/// Upper bound on a watch page body; anything larger is not a watch page.
const MAX_PAGE_BYTES: usize = 16 * 1024 * 1024;

/// Resolver that scrapes the player response from the host's watch page.
#[derive(Debug, Clone)]
pub struct WatchPageResolver {
    origin: String,
    user_agent: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl WatchPageResolver {
    pub fn new(
        origin: impl Into<String>,
        user_agent: impl Into<String>,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            origin: origin.into(),
            user_agent: user_agent.into(),
            connect_timeout,
            timeout,
        }
    }

    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self::new(
            cfg.origin.clone(),
            cfg.user_agent.clone(),
            cfg.connect_timeout(),
            cfg.metadata_timeout(),
        )
    }

    /// Watch page URL for `video_id` on the configured origin.
    pub fn watch_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={}", self.origin.trim_end_matches('/'), video_id)
    }

    fn get_page(&self, url: &str) -> Result<String, MetadataError> {
        let transport = |e: curl::Error| MetadataError::Transport(e.to_string());
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(transport)?;
        easy.follow_location(true).map_err(transport)?;
        easy.max_redirections(10).map_err(transport)?;
        easy.useragent(&self.user_agent).map_err(transport)?;
        easy.accept_encoding("").map_err(transport)?;
        easy.connect_timeout(self.connect_timeout).map_err(transport)?;
        easy.timeout(self.timeout).map_err(transport)?;

        let mut list = curl::easy::List::new();
        list.append("Accept-Language: en-US,en;q=0.9").map_err(transport)?;
        easy.http_headers(list).map_err(transport)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    if body.len() + data.len() > MAX_PAGE_BYTES {
                        return Ok(0); // abort transfer
                    }
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer.perform().map_err(|e| {
                if e.is_write_error() {
                    MetadataError::Transport(format!(
                        "watch page exceeds {} bytes",
                        MAX_PAGE_BYTES
                    ))
                } else {
                    MetadataError::Transport(e.to_string())
                }
            })?;
        }

        let code = easy.response_code().map_err(transport)?;
        if !(200..300).contains(&code) {
            return Err(MetadataError::Http(code));
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl Resolver for WatchPageResolver {
    fn fetch_metadata(&self, video_id: &str) -> Result<ResourceMetadata, MetadataError> {
        let url = self.watch_url(video_id);
        tracing::debug!(%url, "requesting watch page");
        let html = self.get_page(&url)?;
        tracing::debug!(bytes = html.len(), "watch page received");
        player_response::parse_watch_page(&html, video_id)
    }
}
