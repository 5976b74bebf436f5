//! Parse the player response embedded in a watch page into ResourceMetadata.

use serde::Deserialize;

use super::{MediaFormat, ResourceMetadata};
use crate::error::MetadataError;

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    microformat: Option<Microformat>,
    streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    video_id: Option<String>,
    title: Option<String>,
    length_seconds: Option<String>,
    author: Option<String>,
    view_count: Option<String>,
    thumbnail: Option<ThumbnailList>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailList {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Microformat {
    player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicroformatRenderer {
    upload_date: Option<String>,
    owner_channel_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamingData {
    #[serde(default)]
    formats: Vec<RawFormat>,
    #[serde(default)]
    adaptive_formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFormat {
    itag: u32,
    url: Option<String>,
    mime_type: Option<String>,
    height: Option<u32>,
    bitrate: Option<u64>,
    audio_quality: Option<String>,
    audio_channels: Option<u32>,
    content_length: Option<String>,
}

impl RawFormat {
    fn into_media_format(self) -> MediaFormat {
        let mime_type = self.mime_type.unwrap_or_default();
        let has_video = mime_type.starts_with("video/");
        let has_audio = self.audio_quality.is_some()
            || self.audio_channels.is_some()
            || mime_type.starts_with("audio/");
        MediaFormat {
            itag: self.itag,
            url: self.url.filter(|u| !u.is_empty()),
            mime_type,
            height: self.height,
            bitrate: self.bitrate,
            has_video,
            has_audio,
            content_length: self.content_length.and_then(|s| s.parse().ok()),
        }
    }
}

/// Locate the JSON object assigned to `ytInitialPlayerResponse` in a watch page.
/// Returns the remainder of the page starting at the opening brace.
pub fn extract_player_response(html: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(found) = html[search_from..].find(PLAYER_RESPONSE_MARKER) {
        let after_marker = search_from + found + PLAYER_RESPONSE_MARKER.len();
        let rest = html[after_marker..].trim_start_matches(|c: char| c == '"' || c == ']');
        if let Some(assigned) = rest.trim_start().strip_prefix('=') {
            let value = assigned.trim_start();
            if value.starts_with('{') {
                return Some(value);
            }
        }
        search_from = after_marker;
    }
    None
}

/// Parse a watch page into a metadata snapshot.
///
/// Fails when the player response is absent or malformed, when the host
/// reports the video as unplayable, or when `videoDetails`/`title` is missing.
pub fn parse_watch_page(html: &str, requested_id: &str) -> Result<ResourceMetadata, MetadataError> {
    let json = extract_player_response(html).ok_or(MetadataError::MissingPlayerResponse)?;
    // The object is followed by the rest of the script; read exactly one value.
    let response: PlayerResponse = serde_json::Deserializer::from_str(json)
        .into_iter::<PlayerResponse>()
        .next()
        .ok_or(MetadataError::MissingPlayerResponse)?
        .map_err(|e| MetadataError::Parse(e.to_string()))?;
    into_metadata(response, requested_id)
}

fn into_metadata(
    response: PlayerResponse,
    requested_id: &str,
) -> Result<ResourceMetadata, MetadataError> {
    if let Some(playability) = response.playability_status {
        let status = playability.status.unwrap_or_default();
        if !status.is_empty() && status != "OK" {
            return Err(MetadataError::Unplayable {
                reason: playability
                    .reason
                    .unwrap_or_else(|| "no reason given".to_string()),
                status,
            });
        }
    }

    let details = response
        .video_details
        .ok_or(MetadataError::MissingField("videoDetails"))?;
    let title = details
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(MetadataError::MissingField("videoDetails.title"))?;

    let renderer = response
        .microformat
        .and_then(|m| m.player_microformat_renderer);
    let (upload_date, owner_channel_name) = match renderer {
        Some(r) => (r.upload_date, r.owner_channel_name),
        None => (None, None),
    };

    let formats = response
        .streaming_data
        .map(|s| {
            s.formats
                .into_iter()
                .chain(s.adaptive_formats)
                .map(RawFormat::into_media_format)
                .collect()
        })
        .unwrap_or_default();

    Ok(ResourceMetadata {
        video_id: details
            .video_id
            .unwrap_or_else(|| requested_id.to_string()),
        title,
        author_name: details
            .author
            .or(owner_channel_name)
            .filter(|a| !a.trim().is_empty()),
        duration_seconds: details
            .length_seconds
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        view_count: details.view_count.and_then(|s| s.trim().parse().ok()),
        upload_date: upload_date.filter(|d| !d.is_empty()),
        thumbnail_url: details
            .thumbnail
            .and_then(|t| t.thumbnails.into_iter().next())
            .map(|t| t.url),
        formats,
    })
}
