//! Stream selection: the best single stream carrying both audio and video.

use crate::resolver::MediaFormat;

/// Picks the highest quality format that carries audio and video in one
/// stream and exposes a direct URL. Height decides, bitrate breaks ties.
/// Separate audio-only/video-only tracks are never chosen.
pub fn select_highest(formats: &[MediaFormat]) -> Option<&MediaFormat> {
    formats
        .iter()
        .filter(|f| f.has_video && f.has_audio && f.url.is_some())
        .max_by_key(|f| (f.height.unwrap_or(0), f.bitrate.unwrap_or(0)))
}
