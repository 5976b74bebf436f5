//! Structural validation of video URLs and video id extraction.

use url::Url;

/// Length of a video id.
pub const VIDEO_ID_LEN: usize = 11;

/// Hosts serving watch/embed/shorts/live paths.
const WATCH_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
];

/// Hosts that only serve embed paths.
const EMBED_HOSTS: &[&str] = &["youtube-nocookie.com", "www.youtube-nocookie.com"];

/// Short-link host: the id is the first path segment.
const SHORT_HOST: &str = "youtu.be";

/// Path prefixes whose next segment is the video id.
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live"];

/// True if `id` has the shape of a video id: 11 chars of `[A-Za-z0-9_-]`.
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Extracts the video id from a supported video URL.
///
/// Returns `None` for anything that does not parse, is not http(s), is not a
/// supported host, or does not carry a well-formed id. Never panics.
pub fn extract_video_id(input: &str) -> Option<String> {
    let parsed = Url::parse(input.trim()).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let candidate = if host == SHORT_HOST {
        segments.next().map(str::to_string)
    } else if WATCH_HOSTS.contains(&host.as_str()) {
        match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => {
                segments.next().map(str::to_string)
            }
            _ => None,
        }
    } else if EMBED_HOSTS.contains(&host.as_str()) {
        match segments.next() {
            Some("embed") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    }?;

    is_valid_video_id(&candidate).then_some(candidate)
}

/// Pure structural check: does `input` address a supported video resource?
pub fn is_valid_video_url(input: &str) -> bool {
    extract_video_id(input).is_some()
}
