//! Resolver interface for turning a video id into a metadata snapshot.
//!
//! The fetcher only depends on the `Resolver` trait; `WatchPageResolver` is
//! the production implementation backed by the host's watch page.

mod player_response;
mod watch_page;

use serde::Serialize;

use crate::error::MetadataError;

pub use player_response::{extract_player_response, parse_watch_page};
pub use watch_page::WatchPageResolver;

/// One stream offered by the host for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFormat {
    pub itag: u32,
    /// Direct stream URL. `None` when the host only offers a ciphered URL.
    pub url: Option<String>,
    pub mime_type: String,
    pub height: Option<u32>,
    pub bitrate: Option<u64>,
    pub has_video: bool,
    pub has_audio: bool,
    pub content_length: Option<u64>,
}

/// Immutable snapshot of a video's descriptive metadata, fetched once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub video_id: String,
    /// Raw title as reported by the host. Never empty.
    pub title: String,
    pub author_name: Option<String>,
    pub duration_seconds: u64,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
    /// First entry of the host's thumbnail list.
    pub thumbnail_url: Option<String>,
    /// Every stream the host offers; the transfer engine picks one.
    #[serde(skip_serializing)]
    pub formats: Vec<MediaFormat>,
}

/// Trait implemented by metadata sources.
///
/// Implementations block on the network; the fetcher calls them from
/// `spawn_blocking`.
pub trait Resolver: Send + Sync {
    fn fetch_metadata(&self, video_id: &str) -> Result<ResourceMetadata, MetadataError>;
}
